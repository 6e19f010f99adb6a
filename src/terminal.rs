//! Truecolor half-block output.
//!
//! Each terminal cell shows two raster pixels: the background color paints
//! the top pixel and the foreground color paints a lower half block (`▄`).
//! Escape codes are only emitted when a color changes along the row.

use std::io::{self, Write};

use crate::explosion::ExplosionEvent;
use crate::raster::Canvas;

/// How the canvas is shown this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    pub background: (u8, u8, u8),
    pub opacity: f32,
    pub visible: bool,
}

pub struct TerminalPresenter {
    output_buf: Vec<u8>,
}

impl TerminalPresenter {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            output_buf: Vec::with_capacity(cols * rows * 25),
        }
    }

    pub fn present(&mut self, canvas: &Canvas, view: View, out: &mut impl Write) -> io::Result<()> {
        self.output_buf.clear();
        self.output_buf.extend_from_slice(b"\x1b[H");

        let (width, height) = (canvas.cols(), canvas.rows());
        let opacity = if view.visible {
            view.opacity.clamp(0.0, 1.0)
        } else {
            0.0
        };

        let mut prev_top_color: (u8, u8, u8) = (255, 255, 255);
        let mut prev_bot_color: (u8, u8, u8) = (255, 255, 255);

        for y in (0..height).step_by(2) {
            for x in 0..width {
                let top = canvas.pixel(x, y);
                let bot = if y + 1 < height {
                    canvas.pixel(x, y + 1)
                } else {
                    top
                };

                let top_color = composite(top, view.background, opacity);
                let bot_color = composite(bot, view.background, opacity);

                if top_color != prev_top_color {
                    write!(
                        self.output_buf,
                        "\x1b[48;2;{};{};{}m",
                        top_color.0, top_color.1, top_color.2
                    )?;
                    prev_top_color = top_color;
                }
                if bot_color != prev_bot_color {
                    write!(
                        self.output_buf,
                        "\x1b[38;2;{};{};{}m",
                        bot_color.0, bot_color.1, bot_color.2
                    )?;
                    prev_bot_color = bot_color;
                }

                self.output_buf.extend_from_slice("▄".as_bytes());
            }
            self.output_buf.extend_from_slice(b"\x1b[0m");
            prev_top_color = (255, 255, 255);
            prev_bot_color = (255, 255, 255);
            if y + 2 < height {
                self.output_buf.extend_from_slice(b"\r\n");
            }
        }

        out.write_all(&self.output_buf)?;
        out.flush()?;
        Ok(())
    }
}

/// Premultiplied canvas pixel over an opaque background.
fn composite(px: [f32; 4], bg: (u8, u8, u8), opacity: f32) -> (u8, u8, u8) {
    let a = px[3] * opacity;
    let mix = |c: f32, b: u8| {
        let v = b as f32 / 255.0 * (1.0 - a) + c * opacity;
        (v.clamp(0.0, 1.0) * 255.0).round() as u8
    };
    (mix(px[0], bg.0), mix(px[1], bg.1), mix(px[2], bg.2))
}

const GLOW_PER_INTENSITY: f32 = 0.05;
const MAX_GLOW: f32 = 0.18;
/// Exponential decay rate of the glow, per second.
const GLOW_DECAY: f32 = 3.5;

/// Sky lighting driven by explosion events: each burst briefly washes the
/// background toward its color, nearer and bigger bursts more.
#[derive(Debug, Clone, Default)]
pub struct SkyGlow {
    level: f32,
    color: [f32; 3],
}

impl SkyGlow {
    pub fn react(&mut self, event: &ExplosionEvent) {
        let boost = event.intensity * GLOW_PER_INTENSITY / event.depth.max(0.1);
        if boost <= 0.0 {
            return;
        }
        let share = boost / (self.level + boost);
        let rgb = event.color.rgb();
        for (c, e) in self.color.iter_mut().zip(rgb) {
            *c += (e - *c) * share;
        }
        self.level = (self.level + boost).min(MAX_GLOW);
    }

    pub fn decay(&mut self, dt: f32) {
        self.level *= (-GLOW_DECAY * dt).exp();
        if self.level < 1e-3 {
            self.level = 0.0;
        }
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn tint(&self, bg: (u8, u8, u8)) -> (u8, u8, u8) {
        let mix = |b: u8, c: f32| {
            let b = b as f32 / 255.0;
            ((b + (c - b) * self.level).clamp(0.0, 1.0) * 255.0).round() as u8
        };
        (mix(bg.0, self.color[0]), mix(bg.1, self.color[1]), mix(bg.2, self.color[2]))
    }
}
