//! Fireworks for the terminal.
//!
//! Rockets launch from the bottom edge, stall under gravity and burst into
//! particles that fall and fade. The simulation draws through the
//! [`Surface`](surface::Surface) trait; the binary backs it with a software
//! [`Canvas`](raster::Canvas) and prints the result as truecolor half blocks.
//!
//! Per frame: [`Show::frame`](lifecycle::Show::frame) feeds the host
//! timestamp to the [`Scheduler`](scheduler::Scheduler), steps the
//! [`Simulation`](simulation::Simulation) and hands it to the
//! [`renderer`].

pub mod color;
pub mod config;
pub mod entity;
pub mod error;
pub mod explosion;
pub mod lifecycle;
pub mod raster;
pub mod renderer;
pub mod scheduler;
pub mod simulation;
pub mod surface;
pub mod terminal;

pub use error::{Error, Result};
pub use explosion::{ExplosionEvent, EXPLOSION_EVENT};
pub use lifecycle::{Presentation, Show};
pub use simulation::{Settings, Simulation};
