//! Frame composition.

use crate::color::Rgba;
use crate::simulation::Simulation;
use crate::surface::{Composite, Surface};

/// Black painted over the previous frame; what is left of it becomes the
/// motion trail.
pub const TRAIL_FADE: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.25);

/// Fade the previous frame, then draw rockets and particles additively.
///
/// The order matters: drawing before the fade would erase the new frame
/// along with the old one.
pub fn render(sim: &Simulation, surface: &mut impl Surface) {
    let (w, h) = (surface.width(), surface.height());

    surface.set_global_alpha(1.0);
    surface.set_fill_style(TRAIL_FADE);
    surface.fill_rect(0.0, 0.0, w, h);

    surface.set_composite(Composite::Lighter);
    for rocket in sim.rockets() {
        rocket.draw(surface);
    }
    for particle in sim.particles() {
        particle.draw(surface);
    }
    surface.set_composite(Composite::SourceOver);
}
