//! Software rasterizer backing the terminal output.
//!
//! The canvas keeps a premultiplied RGBA buffer of `cols x rows` raster
//! pixels. Callers draw in logical pixels; `scale` logical pixels map onto one
//! raster pixel, the same way a device-pixel-ratio transform maps CSS pixels
//! onto a browser canvas.

use std::f32::consts::{PI, TAU};

use crate::color::Rgba;
use crate::surface::{Composite, Surface};

#[derive(Debug, Clone, Copy)]
struct ArcSegment {
    cx: f32,
    cy: f32,
    radius: f32,
    start: f32,
    end: f32,
}

pub struct Canvas {
    cols: usize,
    rows: usize,
    scale: f32,
    pixels: Vec<[f32; 4]>,
    fill_style: Rgba,
    global_alpha: f32,
    composite: Composite,
    path: Vec<ArcSegment>,
}

impl Canvas {
    pub fn new(cols: usize, rows: usize, scale: f32) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        };
        Self {
            cols,
            rows,
            scale,
            pixels: vec![[0.0; 4]; cols * rows],
            fill_style: Rgba::BLACK,
            global_alpha: 1.0,
            composite: Composite::SourceOver,
            path: Vec::new(),
        }
    }

    /// Resize the backing store. Contents are discarded, as with a browser
    /// canvas whose dimensions are reassigned.
    pub fn resize(&mut self, cols: usize, rows: usize) {
        self.cols = cols;
        self.rows = rows;
        self.pixels.clear();
        self.pixels.resize(cols * rows, [0.0; 4]);
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Premultiplied RGBA of one raster pixel.
    pub fn pixel(&self, x: usize, y: usize) -> [f32; 4] {
        self.pixels[y * self.cols + x]
    }

    pub fn pixels(&self) -> &[[f32; 4]] {
        &self.pixels
    }

    /// Raster pixel range covering `[from, to)` in logical units, clipped.
    fn span(&self, from: f32, to: f32, limit: usize) -> std::ops::Range<usize> {
        let (lo, hi) = if from <= to { (from, to) } else { (to, from) };
        let lo = (lo / self.scale).round().clamp(0.0, limit as f32) as usize;
        let hi = (hi / self.scale).round().clamp(0.0, limit as f32) as usize;
        lo..hi
    }

    fn blend(&mut self, idx: usize, coverage: f32) {
        let a = self.fill_style.a * self.global_alpha * coverage;
        if a <= 0.0 {
            return;
        }
        let src = [self.fill_style.r * a, self.fill_style.g * a, self.fill_style.b * a, a];
        let dst = &mut self.pixels[idx];
        match self.composite {
            Composite::SourceOver => {
                for i in 0..4 {
                    dst[i] = src[i] + dst[i] * (1.0 - a);
                }
            }
            Composite::Lighter => {
                for i in 0..4 {
                    dst[i] = (dst[i] + src[i]).min(1.0);
                }
            }
        }
    }

    fn fill_segment(&mut self, seg: ArcSegment) {
        let r = seg.radius;
        if !(r > 0.0) || self.cols == 0 || self.rows == 0 {
            return;
        }

        let sweep = seg.end - seg.start;
        let full = sweep.abs() >= TAU;

        // Smaller than a pixel: deposit the disc's area on the pixel under it.
        if r < 0.5 && full {
            let (px, py) = (seg.cx.floor(), seg.cy.floor());
            if px >= 0.0 && py >= 0.0 && (px as usize) < self.cols && (py as usize) < self.rows {
                let idx = py as usize * self.cols + px as usize;
                self.blend(idx, (PI * r * r).min(1.0));
            }
            return;
        }

        let chord = if full { None } else { Some(Chord::new(&seg)) };

        let x0 = (seg.cx - r - 1.0).floor().max(0.0) as usize;
        let y0 = (seg.cy - r - 1.0).floor().max(0.0) as usize;
        let x1 = ((seg.cx + r + 1.0).ceil().max(0.0) as usize).min(self.cols);
        let y1 = ((seg.cy + r + 1.0).ceil().max(0.0) as usize).min(self.rows);

        for y in y0..y1 {
            for x in x0..x1 {
                let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
                let d = ((px - seg.cx).powi(2) + (py - seg.cy).powi(2)).sqrt();
                let coverage = (r + 0.5 - d).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }
                if let Some(chord) = &chord {
                    if !chord.contains(px, py) {
                        continue;
                    }
                }
                self.blend(y * self.cols + x, coverage);
            }
        }
    }
}

/// The straight edge closing a partial arc.
struct Chord {
    ax: f32,
    ay: f32,
    bx: f32,
    by: f32,
    arc_side: f32,
}

impl Chord {
    fn new(seg: &ArcSegment) -> Self {
        let sweep = (seg.end - seg.start).rem_euclid(TAU);
        let point = |angle: f32| {
            (seg.cx + seg.radius * angle.cos(), seg.cy + seg.radius * angle.sin())
        };
        let (ax, ay) = point(seg.start);
        let (bx, by) = point(seg.start + sweep);
        let (mx, my) = point(seg.start + sweep / 2.0);
        let mut chord = Self {
            ax,
            ay,
            bx,
            by,
            arc_side: 0.0,
        };
        chord.arc_side = chord.side(mx, my);
        chord
    }

    fn side(&self, x: f32, y: f32) -> f32 {
        (self.bx - self.ax) * (y - self.ay) - (self.by - self.ay) * (x - self.ax)
    }

    fn contains(&self, x: f32, y: f32) -> bool {
        self.side(x, y) * self.arc_side >= 0.0
    }
}

impl Surface for Canvas {
    fn width(&self) -> f32 {
        self.cols as f32 * self.scale
    }

    fn height(&self) -> f32 {
        self.rows as f32 * self.scale
    }

    fn set_fill_style(&mut self, style: Rgba) {
        self.fill_style = style;
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        // Out-of-range values are ignored, matching the 2D canvas API.
        if (0.0..=1.0).contains(&alpha) {
            self.global_alpha = alpha;
        }
    }

    fn set_composite(&mut self, op: Composite) {
        self.composite = op;
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let xs = self.span(x, x + w, self.cols);
        let ys = self.span(y, y + h, self.rows);
        for py in ys {
            for px in xs.clone() {
                self.blend(py * self.cols + px, 1.0);
            }
        }
    }

    fn clear_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let xs = self.span(x, x + w, self.cols);
        let ys = self.span(y, y + h, self.rows);
        for py in ys {
            for px in xs.clone() {
                self.pixels[py * self.cols + px] = [0.0; 4];
            }
        }
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn arc(&mut self, x: f32, y: f32, radius: f32, start_angle: f32, end_angle: f32) {
        self.path.push(ArcSegment {
            cx: x / self.scale,
            cy: y / self.scale,
            radius: radius / self.scale,
            start: start_angle,
            end: end_angle,
        });
    }

    fn fill(&mut self) {
        for i in 0..self.path.len() {
            let seg = self.path[i];
            self.fill_segment(seg);
        }
    }
}
