//! Rockets and the particles their bursts leave behind.

use std::f32::consts::TAU;

use crate::color::Color;
use crate::surface::Surface;

/// Downward acceleration on burst particles, logical px/s².
pub const PARTICLE_GRAVITY: f32 = 40.0;
/// Downward acceleration on ascending rockets, logical px/s².
pub const ROCKET_GRAVITY: f32 = 400.0;
/// A rocket bursts once its vertical velocity rises above this.
pub const BURST_VELOCITY: f32 = -80.0;
/// Radius of a rocket head, logical px.
pub const ROCKET_RADIUS: f32 = 2.5;

/// Uniform sample in `[min, max)`.
pub(crate) fn uniform(rng: &mut fastrand::Rng, min: f32, max: f32) -> f32 {
    rng.f32() * (max - min) + min
}

#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub color: Color,
    /// Seconds until expiry.
    pub life: f32,
    /// Seconds since the burst.
    pub age: f32,
    /// Radius at birth.
    pub size: f32,
    pub depth: f32,
}

impl Particle {
    pub fn update(&mut self, dt: f32) {
        self.vy += PARTICLE_GRAVITY * dt;
        self.x += self.vx * dt;
        self.y += self.vy * dt;
        self.age += dt;
    }

    pub fn is_expired(&self) -> bool {
        self.age >= self.life
    }

    /// Linear fade from 1 at birth to 0 at expiry.
    pub fn alpha(&self) -> f32 {
        1.0 - (self.age / self.life).min(1.0)
    }

    pub fn draw(&self, surface: &mut impl Surface) {
        let alpha = self.alpha();
        surface.set_global_alpha(alpha);
        surface.set_fill_style(self.color.fill());
        surface.begin_path();
        surface.arc(self.x, self.y, self.size * alpha, 0.0, TAU);
        surface.fill();
    }
}

/// What a burst needs from the rocket that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Burst {
    pub x: f32,
    pub y: f32,
    pub color: Color,
    pub depth: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RocketState {
    Flying,
    Exploded(Burst),
}

#[derive(Debug, Clone)]
pub struct Rocket {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Distance factor: below 1 is near, above 1 is far.
    pub depth: f32,
    pub color: Color,
    pub exploded: bool,
}

impl Rocket {
    /// A rocket leaving the bottom edge of a `width x height` surface.
    ///
    /// Launch speed is divided by depth so rockets peak at mixed heights.
    pub fn launch(rng: &mut fastrand::Rng, width: f32, height: f32) -> Self {
        let x = uniform(rng, width * 0.15, width * 0.85);
        let vx = uniform(rng, -40.0, 40.0);
        let depth = uniform(rng, 0.6, 1.6);
        let vy = uniform(rng, -900.0, -700.0) / depth;
        let hue = uniform(rng, 0.0, 360.0).floor() as u16;

        Self {
            x,
            y: height + 10.0,
            vx,
            vy,
            depth,
            color: Color::hsl(hue, 90, 60),
            exploded: false,
        }
    }

    pub fn update(&mut self, dt: f32) -> RocketState {
        self.vy += ROCKET_GRAVITY * dt;
        self.x += self.vx * dt;
        self.y += self.vy * dt;

        if self.vy > BURST_VELOCITY && !self.exploded {
            self.exploded = true;
            return RocketState::Exploded(Burst {
                x: self.x,
                y: self.y,
                color: self.color.clone(),
                depth: self.depth,
            });
        }
        RocketState::Flying
    }

    pub fn draw(&self, surface: &mut impl Surface) {
        surface.set_global_alpha(1.0);
        surface.set_fill_style(self.color.fill());
        surface.begin_path();
        surface.arc(self.x, self.y, ROCKET_RADIUS, 0.0, TAU);
        surface.fill();
    }
}
