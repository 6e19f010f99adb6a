//! Start/stop controls and the cosmetic state around the simulation.
//!
//! [`Presentation`] tracks what the viewer sees of the surface: its opacity,
//! whether it is shown at all, and which background sits behind it. Stopping
//! fades the surface out over [`FADE_OUT_MS`], then [`HIDE_AFTER_MS`] after
//! the stop clears and hides it and forces the dark background. None of that
//! feeds back into the simulation.
//!
//! [`Show`] bundles simulation, scheduler, presentation and surface behind
//! the two lifecycle entry points and the per-frame callback.

use tracing::info;

use crate::explosion::EventEmitter;
use crate::renderer;
use crate::scheduler::Scheduler;
use crate::simulation::{Settings, Simulation};
use crate::surface::Surface;

pub const FADE_OUT_MS: f64 = 800.0;
pub const HIDE_AFTER_MS: f64 = 900.0;
/// Entity count at which the background is forced dark.
pub const DEFAULT_DARK_THRESHOLD: usize = 30;
pub const DARK_BACKGROUND: (u8, u8, u8) = (0, 0, 0);

#[derive(Debug, Clone, Copy, PartialEq)]
enum Teardown {
    /// Requested; anchored to the next frame timestamp.
    Pending,
    Running { started_at: f64 },
}

#[derive(Debug, Clone)]
pub struct Presentation {
    opacity: f32,
    visible: bool,
    teardown: Option<Teardown>,
    forced_dark: bool,
    crowded: bool,
    background: (u8, u8, u8),
    dark_threshold: usize,
}

impl Presentation {
    pub fn new(background: (u8, u8, u8), dark_threshold: usize) -> Self {
        Self {
            opacity: 1.0,
            visible: true,
            teardown: None,
            forced_dark: false,
            crowded: false,
            background,
            dark_threshold,
        }
    }

    /// Show the surface at full opacity and hand the background back to the
    /// crowd heuristic. Cancels a pending teardown.
    pub fn show(&mut self) {
        self.teardown = None;
        self.visible = true;
        self.opacity = 1.0;
        self.forced_dark = false;
    }

    /// Start the fade-out. Ignored while one is already underway or the
    /// surface is hidden.
    pub fn begin_teardown(&mut self) {
        if self.teardown.is_none() && self.visible {
            self.teardown = Some(Teardown::Pending);
        }
    }

    /// Progress the fade/hide timeline to `timestamp_ms`.
    pub fn advance(&mut self, timestamp_ms: f64, surface: &mut impl Surface) {
        let started_at = match self.teardown {
            None => return,
            Some(Teardown::Pending) => {
                self.teardown = Some(Teardown::Running {
                    started_at: timestamp_ms,
                });
                timestamp_ms
            }
            Some(Teardown::Running { started_at }) => started_at,
        };

        let elapsed = (timestamp_ms - started_at).max(0.0);
        let progress = (elapsed / FADE_OUT_MS).min(1.0) as f32;
        self.opacity = 1.0 - ease(progress);

        if elapsed >= HIDE_AFTER_MS {
            surface.clear();
            self.visible = false;
            self.opacity = 0.0;
            self.forced_dark = true;
            self.teardown = None;
        }
    }

    /// Re-evaluate the crowd heuristic for this frame.
    pub fn update_background(&mut self, entity_count: usize) {
        self.crowded = entity_count >= self.dark_threshold;
    }

    pub fn background(&self) -> (u8, u8, u8) {
        if self.forced_dark || self.crowded {
            DARK_BACKGROUND
        } else {
            self.background
        }
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_tearing_down(&self) -> bool {
        self.teardown.is_some()
    }
}

/// CSS `ease`, i.e. `cubic-bezier(0.25, 0.1, 0.25, 1.0)`.
fn ease(progress: f32) -> f32 {
    fn bezier(t: f32, p1: f32, p2: f32) -> f32 {
        let u = 1.0 - t;
        3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t
    }

    let x = progress.clamp(0.0, 1.0);
    let mut t = x;
    for _ in 0..8 {
        let err = bezier(t, 0.25, 0.25) - x;
        if err.abs() < 1e-5 {
            break;
        }
        let slope = 0.75 * (1.0 - t) * (1.0 - t) + 2.25 * t * t;
        t = (t - err / slope).clamp(0.0, 1.0);
    }
    bezier(t, 0.1, 1.0)
}

/// A running fireworks display on one surface.
pub struct Show<S> {
    sim: Simulation,
    scheduler: Scheduler,
    presentation: Presentation,
    surface: S,
}

impl<S: Surface> Show<S> {
    pub fn new(
        surface: S,
        settings: &Settings,
        presentation: Presentation,
        events: EventEmitter,
    ) -> Self {
        let sim = Simulation::new(surface.width(), surface.height(), settings, events);
        Self {
            sim,
            scheduler: Scheduler::new(),
            presentation,
            surface,
        }
    }

    pub fn start(&mut self) {
        if !self.sim.is_running()
            || !self.presentation.is_visible()
            || self.presentation.is_tearing_down()
        {
            info!("fireworks started");
        }
        self.sim.start();
        self.presentation.show();
    }

    pub fn stop(&mut self) {
        if self.sim.is_running() {
            info!("fireworks stopped");
        }
        self.sim.stop();
        self.presentation.begin_teardown();
    }

    pub fn toggle(&mut self) {
        if self.sim.is_running() {
            self.stop()
        } else {
            self.start()
        }
    }

    /// Per-frame callback. `timestamp_ms` comes from a monotonic clock.
    pub fn frame(&mut self, timestamp_ms: f64) {
        self.presentation.update_background(self.sim.entity_count());
        self.presentation.advance(timestamp_ms, &mut self.surface);

        if let Some(dt) = self.scheduler.tick(timestamp_ms) {
            self.sim.step(dt);
            renderer::render(&self.sim, &mut self.surface);
        }
    }

    /// Change the surface dimensions. Entities in flight are kept.
    pub fn resize_surface(&mut self, resize: impl FnOnce(&mut S)) {
        resize(&mut self.surface);
        let (w, h) = (self.surface.width(), self.surface.height());
        self.sim.resize(w, h);
        info!(width = w, height = h, "surface resized");
    }

    pub fn is_running(&self) -> bool {
        self.sim.is_running()
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}
