//! The immediate-mode drawing contract the effect renders against.

use crate::color::Rgba;

/// Global compositing operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Composite {
    /// Normal painting: the source covers the destination.
    #[default]
    SourceOver,
    /// Additive: overlapping paint sums brightness.
    Lighter,
}

/// A mutable 2D raster target.
///
/// Coordinates and sizes are in logical pixels. Implementations decide how
/// logical pixels map onto their backing store.
pub trait Surface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;

    fn set_fill_style(&mut self, style: Rgba);
    fn set_global_alpha(&mut self, alpha: f32);
    fn set_composite(&mut self, op: Composite);

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32);
    /// Reset the rectangle to fully transparent.
    fn clear_rect(&mut self, x: f32, y: f32, w: f32, h: f32);

    /// Discard the current path.
    fn begin_path(&mut self);
    /// Add a circular arc to the current path. Angles are in radians.
    fn arc(&mut self, x: f32, y: f32, radius: f32, start_angle: f32, end_angle: f32);
    /// Fill the current path with the fill style.
    fn fill(&mut self);

    /// Clear the whole surface.
    fn clear(&mut self) {
        let (w, h) = (self.width(), self.height());
        self.clear_rect(0.0, 0.0, w, h);
    }
}
