//! Burst generation and the explosion notification.
//!
//! Every burst appends a batch of particles spread around the rocket's depth
//! and emits one [`ExplosionEvent`] for whoever listens (the terminal host
//! uses it to light up the sky). Listeners are optional and never block the
//! simulation: the event goes out with `try_send` and a full or closed
//! channel is ignored.

use std::f32::consts::TAU;

use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::color::{Color, Dimming};
use crate::entity::{uniform, Burst, Particle};

/// Name of the notification emitted on every burst.
pub const EXPLOSION_EVENT: &str = "firework-explosion";

/// Particle count range per burst, `[min, max)`.
pub const PARTICLE_COUNT: (usize, usize) = (60, 160);
/// Particle depth is always clamped into this range.
pub const DEPTH_RANGE: (f32, f32) = (0.4, 2.0);
/// Particles deeper than this get the dimmed color.
pub const DIM_DEPTH: f32 = 1.15;
/// Intensity never exceeds this.
pub const MAX_INTENSITY: f32 = 3.0;

/// Payload of [`EXPLOSION_EVENT`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExplosionEvent {
    pub x: f32,
    pub y: f32,
    pub color: Color,
    /// `count / 80`, capped at [`MAX_INTENSITY`].
    pub intensity: f32,
    pub count: usize,
    pub depth: f32,
}

impl ExplosionEvent {
    pub fn name(&self) -> &'static str {
        EXPLOSION_EVENT
    }
}

/// Sending half of the explosion notification.
#[derive(Debug, Clone, Default)]
pub struct EventEmitter {
    sender: Option<Sender<ExplosionEvent>>,
}

impl EventEmitter {
    /// An emitter nobody listens to.
    pub fn detached() -> Self {
        Self { sender: None }
    }

    /// A bounded channel; events beyond `capacity` unread ones are dropped.
    pub fn bounded(capacity: usize) -> (Self, Receiver<ExplosionEvent>) {
        let (sender, receiver) = crossbeam_channel::bounded(capacity);
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }

    pub fn emit(&self, event: ExplosionEvent) {
        let Some(sender) = &self.sender else {
            return;
        };
        match sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::trace!("{EXPLOSION_EVENT} dropped: listener is behind")
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::trace!("{EXPLOSION_EVENT} dropped: no listener")
            }
        }
    }
}

/// Burst with a random particle count.
pub fn explode(
    particles: &mut Vec<Particle>,
    rng: &mut fastrand::Rng,
    burst: &Burst,
    dimming: Dimming,
    events: &EventEmitter,
) -> ExplosionEvent {
    let count = rng.usize(PARTICLE_COUNT.0..PARTICLE_COUNT.1);
    explode_n(particles, rng, burst, count, dimming, events)
}

/// Burst producing exactly `count` particles.
pub fn explode_n(
    particles: &mut Vec<Particle>,
    rng: &mut fastrand::Rng,
    burst: &Burst,
    count: usize,
    dimming: Dimming,
    events: &EventEmitter,
) -> ExplosionEvent {
    particles.reserve(count);
    let dimmed = burst.color.dimmed(dimming);

    for _ in 0..count {
        let angle = rng.f32() * TAU;
        let depth = (burst.depth * uniform(rng, 0.75, 1.35)).clamp(DEPTH_RANGE.0, DEPTH_RANGE.1);
        // Farther particles move slower and look smaller.
        let speed = uniform(rng, 120.0, 640.0) / depth;
        let life = uniform(rng, 0.9, 2.4);
        let size = uniform(rng, 2.0, 6.0) / depth;
        let color = if depth > DIM_DEPTH {
            dimmed.clone()
        } else {
            burst.color.clone()
        };

        particles.push(Particle {
            x: burst.x,
            y: burst.y,
            vx: angle.cos() * speed,
            vy: angle.sin() * speed,
            color,
            life,
            age: 0.0,
            size,
            depth,
        });
    }

    let event = ExplosionEvent {
        x: burst.x,
        y: burst.y,
        color: burst.color.clone(),
        intensity: (count as f32 / 80.0).min(MAX_INTENSITY),
        count,
        depth: burst.depth,
    };
    tracing::debug!(
        x = event.x,
        y = event.y,
        color = %event.color,
        count,
        depth = event.depth,
        "burst"
    );
    events.emit(event.clone());
    event
}

#[cfg(test)]
mod tests {
    use super::*;

    fn burst(color: &str, depth: f32) -> Burst {
        Burst {
            x: 100.0,
            y: 100.0,
            color: Color::parse(color).unwrap(),
            depth,
        }
    }

    #[test]
    fn test_explode_n_appends_exactly_n_and_notifies() {
        let (events, rx) = EventEmitter::bounded(4);
        let mut rng = fastrand::Rng::with_seed(42);
        let mut particles = Vec::new();

        let event = explode_n(
            &mut particles,
            &mut rng,
            &burst("hsl(200,90%,60%)", 1.0),
            100,
            Dimming::Literal,
            &events,
        );

        assert_eq!(particles.len(), 100);
        let received = rx.try_recv().unwrap();
        assert!(rx.try_recv().is_err());
        assert_eq!(received, event);
        assert_eq!(received.name(), "firework-explosion");
        assert_eq!(received.count, 100);
        assert_eq!(received.intensity, 1.25);
        assert_eq!(received.depth, 1.0);
        assert_eq!((received.x, received.y), (100.0, 100.0));
    }

    #[test]
    fn test_particles_stay_in_ranges() {
        let mut rng = fastrand::Rng::with_seed(3);
        let mut particles = Vec::new();
        for depth in [0.3, 0.6, 1.0, 1.6, 2.5] {
            explode_n(
                &mut particles,
                &mut rng,
                &burst("hsl(10, 90%, 60%)", depth),
                150,
                Dimming::Literal,
                &EventEmitter::detached(),
            );
        }

        for p in &particles {
            assert!((0.4..=2.0).contains(&p.depth), "depth {}", p.depth);
            assert!((0.9..2.4).contains(&p.life), "life {}", p.life);
            assert_eq!(p.age, 0.0);
            let speed = (p.vx * p.vx + p.vy * p.vy).sqrt() * p.depth;
            assert!((119.9..640.1).contains(&speed), "speed {speed}");
            let size = p.size * p.depth;
            assert!((1.99..6.01).contains(&size), "size {size}");
        }
    }

    #[test]
    fn test_distant_particles_are_dimmed() {
        let mut rng = fastrand::Rng::with_seed(11);
        let mut particles = Vec::new();
        explode_n(
            &mut particles,
            &mut rng,
            &burst("hsl(200, 90%, 60%)", 1.5),
            120,
            Dimming::Literal,
            &EventEmitter::detached(),
        );

        for p in &particles {
            if p.depth > DIM_DEPTH {
                assert_eq!(p.color.as_str(), "hsl(200, 70%, 60%)");
            } else {
                assert_eq!(p.color.as_str(), "hsl(200, 90%, 60%)");
            }
        }
        assert!(particles.iter().any(|p| p.depth > DIM_DEPTH));
    }

    #[test]
    fn test_lightness_dimming_applies_to_deep_particles() {
        let b = burst("hsl(200, 80%, 90%)", 1.2);
        let expected = b.color.dimmed(Dimming::Lightness);
        let mut particles = Vec::new();
        explode_n(
            &mut particles,
            &mut fastrand::Rng::with_seed(13),
            &b,
            120,
            Dimming::Lightness,
            &EventEmitter::detached(),
        );

        let (deep, near): (Vec<_>, Vec<_>) = particles.iter().partition(|p| p.depth > DIM_DEPTH);
        assert!(!deep.is_empty() && !near.is_empty());
        for p in deep {
            assert_eq!(p.color, expected);
            let (r, g, bl) = p.color.to_rgb8();
            let (er, eg, eb) = Color::parse("hsl(200, 80%, 70%)").unwrap().to_rgb8();
            assert!(r.abs_diff(er) <= 2 && g.abs_diff(eg) <= 2 && bl.abs_diff(eb) <= 2);
        }
        for p in near {
            assert_eq!(p.color, b.color);
        }
    }

    #[test]
    fn test_intensity_is_capped() {
        let mut particles = Vec::new();
        let event = explode_n(
            &mut particles,
            &mut fastrand::Rng::with_seed(1),
            &burst("#ffffff", 1.0),
            400,
            Dimming::Literal,
            &EventEmitter::detached(),
        );
        assert_eq!(event.intensity, MAX_INTENSITY);
    }

    #[test]
    fn test_random_count_in_range() {
        let mut rng = fastrand::Rng::with_seed(5);
        for _ in 0..50 {
            let mut particles = Vec::new();
            let event = explode(
                &mut particles,
                &mut rng,
                &burst("hsl(0, 90%, 60%)", 1.0),
                Dimming::Literal,
                &EventEmitter::detached(),
            );
            assert!((60..160).contains(&event.count));
            assert_eq!(particles.len(), event.count);
        }
    }

    #[test]
    fn test_emit_never_blocks_on_full_or_closed_channel() {
        let (events, rx) = EventEmitter::bounded(1);
        let mut particles = Vec::new();
        let mut rng = fastrand::Rng::with_seed(9);
        let b = burst("hsl(0, 90%, 60%)", 1.0);

        explode_n(&mut particles, &mut rng, &b, 60, Dimming::Literal, &events);
        explode_n(&mut particles, &mut rng, &b, 60, Dimming::Literal, &events);
        assert_eq!(rx.len(), 1);

        drop(rx);
        explode_n(&mut particles, &mut rng, &b, 60, Dimming::Literal, &events);
        assert_eq!(particles.len(), 180);
    }
}
