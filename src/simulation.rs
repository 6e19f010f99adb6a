//! The fireworks simulation context.
//!
//! One [`Simulation`] owns every live rocket and particle, the running flag
//! and the launch timer. A step spawns rockets on a randomized timer (only
//! while running), integrates everything, bursts rockets that stalled and
//! culls expired particles.

use crate::color::{Color, Dimming};
use crate::entity::{uniform, Burst, Particle, Rocket, RocketState};
use crate::explosion::{self, EventEmitter, ExplosionEvent};

/// Seconds between automatic launches, `[min, max)`.
pub const LAUNCH_INTERVAL: (f32, f32) = (0.35, 1.0);
/// Rockets in the air when a simulation is created.
pub const INITIAL_ROCKETS: usize = 3;

/// Tunables of a simulation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub seed: Option<u64>,
    pub dimming: Dimming,
    pub initial_rockets: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,
            dimming: Dimming::default(),
            initial_rockets: INITIAL_ROCKETS,
        }
    }
}

pub struct Simulation {
    width: f32,
    height: f32,
    rockets: Vec<Rocket>,
    particles: Vec<Particle>,
    running: bool,
    launch_timer: f32,
    rng: fastrand::Rng,
    dimming: Dimming,
    events: EventEmitter,
}

impl Simulation {
    pub fn new(width: f32, height: f32, settings: &Settings, events: EventEmitter) -> Self {
        let rng = match settings.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        let mut sim = Self {
            width,
            height,
            rockets: Vec::new(),
            particles: Vec::new(),
            running: true,
            launch_timer: 0.0,
            rng,
            dimming: settings.dimming,
            events,
        };
        for _ in 0..settings.initial_rockets {
            sim.launch();
        }
        sim
    }

    /// Advance by `dt` seconds. Callers clamp `dt` (see
    /// [`MAX_FRAME_DT`](crate::scheduler::MAX_FRAME_DT)).
    pub fn step(&mut self, dt: f32) {
        if self.running {
            self.launch_timer -= dt;
            if self.launch_timer <= 0.0 {
                self.launch_timer = uniform(&mut self.rng, LAUNCH_INTERVAL.0, LAUNCH_INTERVAL.1);
                self.launch();
            }
        }

        let mut bursts = Vec::new();
        self.rockets.retain_mut(|rocket| match rocket.update(dt) {
            RocketState::Flying => true,
            RocketState::Exploded(burst) => {
                bursts.push(burst);
                false
            }
        });

        for burst in bursts {
            self.burst(&burst);
        }

        self.particles.retain_mut(|particle| {
            particle.update(dt);
            !particle.is_expired()
        });
    }

    /// Send up one rocket from the bottom edge.
    pub fn launch(&mut self) {
        let rocket = Rocket::launch(&mut self.rng, self.width, self.height);
        tracing::debug!(x = rocket.x, depth = rocket.depth, color = %rocket.color, "launch");
        self.rockets.push(rocket);
    }

    /// Burst at an arbitrary point with a random particle count.
    pub fn explode(&mut self, x: f32, y: f32, color: Color, depth: f32) -> ExplosionEvent {
        self.burst(&Burst { x, y, color, depth })
    }

    /// Burst at an arbitrary point with exactly `count` particles.
    pub fn explode_n(
        &mut self,
        x: f32,
        y: f32,
        color: Color,
        depth: f32,
        count: usize,
    ) -> ExplosionEvent {
        explosion::explode_n(
            &mut self.particles,
            &mut self.rng,
            &Burst { x, y, color, depth },
            count,
            self.dimming,
            &self.events,
        )
    }

    fn burst(&mut self, burst: &Burst) -> ExplosionEvent {
        explosion::explode(
            &mut self.particles,
            &mut self.rng,
            burst,
            self.dimming,
            &self.events,
        )
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    /// Stop launching and drop everything in flight.
    pub fn stop(&mut self) {
        self.running = false;
        self.clear();
    }

    pub fn clear(&mut self) {
        self.rockets.clear();
        self.particles.clear();
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn launch_timer(&self) -> f32 {
        self.launch_timer
    }

    pub fn set_launch_timer(&mut self, seconds: f32) {
        self.launch_timer = seconds;
    }

    pub fn rockets(&self) -> &[Rocket] {
        &self.rockets
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn entity_count(&self) -> usize {
        self.rockets.len() + self.particles.len()
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64, initial_rockets: usize) -> Simulation {
        let settings = Settings {
            seed: Some(seed),
            initial_rockets,
            ..Settings::default()
        };
        Simulation::new(800.0, 600.0, &settings, EventEmitter::detached())
    }

    #[test]
    fn test_initial_salvo() {
        assert_eq!(seeded(1, INITIAL_ROCKETS).rockets().len(), 3);
        assert_eq!(seeded(1, 0).entity_count(), 0);
    }

    #[test]
    fn test_step_launches_when_timer_runs_out() {
        let mut sim = seeded(2, 0);
        sim.set_launch_timer(0.0);
        sim.step(0.016);
        assert_eq!(sim.rockets().len(), 1);
        assert!((LAUNCH_INTERVAL.0..LAUNCH_INTERVAL.1).contains(&sim.launch_timer()));

        // Timer is re-armed, so the next short step launches nothing.
        sim.step(0.016);
        assert_eq!(sim.rockets().len(), 1);
    }

    #[test]
    fn test_no_launch_while_stopped() {
        let mut sim = seeded(3, 0);
        sim.stop();
        sim.set_launch_timer(0.0);
        sim.step(0.016);
        assert!(sim.rockets().is_empty());
        assert_eq!(sim.launch_timer(), 0.0);
    }

    #[test]
    fn test_rocket_bursts_and_leaves_particles() {
        let mut sim = seeded(4, 1);
        sim.stop();
        sim.start();
        sim.set_launch_timer(1000.0);
        sim.launch();

        let mut steps = 0;
        while !sim.rockets().is_empty() {
            sim.step(0.05);
            steps += 1;
            assert!(steps < 200, "rocket never burst");
        }
        assert!(sim.particles().len() >= 60);
    }

    #[test]
    fn test_exploded_rocket_never_returns() {
        let mut sim = seeded(5, 0);
        sim.set_launch_timer(1000.0);
        sim.launch();
        let mut burst_seen = false;
        for _ in 0..400 {
            let before = sim.rockets().len();
            sim.step(0.02);
            if before == 1 && sim.rockets().is_empty() {
                burst_seen = true;
            }
            if burst_seen {
                assert!(sim.rockets().is_empty());
            }
        }
        assert!(burst_seen);
    }

    #[test]
    fn test_explode_adds_random_burst_and_one_event() {
        let (events, rx) = EventEmitter::bounded(4);
        let settings = Settings {
            seed: Some(12),
            initial_rockets: 0,
            ..Settings::default()
        };
        let mut sim = Simulation::new(800.0, 600.0, &settings, events);

        let event = sim.explode(300.0, 200.0, Color::parse("gold").unwrap(), 0.8);

        assert!((60..160).contains(&event.count), "count {}", event.count);
        assert_eq!(sim.particles().len(), event.count);
        assert!(sim.particles().iter().all(|p| (p.x, p.y) == (300.0, 200.0)));
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![event]);
    }

    #[test]
    fn test_particles_culled_exactly_at_life() {
        let mut sim = seeded(6, 0);
        sim.stop();
        sim.explode_n(100.0, 100.0, Color::hsl(200, 90, 60), 1.0, 80);
        let shortest = sim.particles().iter().map(|p| p.life).fold(f32::MAX, f32::min);

        let mut age = 0.0f32;
        while sim.particles().len() == 80 {
            sim.step(0.01);
            age += 0.01;
        }
        // Nothing may disappear before the shortest life is reached.
        assert!(age >= shortest - 1e-3);
        assert!(age < shortest + 0.011);
        assert!(sim.particles().iter().all(|p| p.age < p.life));
    }

    #[test]
    fn test_stop_clears_and_start_resumes() {
        let mut sim = seeded(7, 3);
        sim.explode_n(10.0, 10.0, Color::hsl(0, 90, 60), 1.0, 60);
        sim.stop();
        assert!(!sim.is_running());
        assert_eq!(sim.entity_count(), 0);
        sim.start();
        assert!(sim.is_running());
        assert_eq!(sim.entity_count(), 0);
    }

    #[test]
    fn test_long_run_stays_finite() {
        let mut sim = seeded(8, 3);
        for _ in 0..6000 {
            sim.step(0.05);
        }
        for r in sim.rockets() {
            assert!(r.x.is_finite() && r.y.is_finite());
        }
        for p in sim.particles() {
            assert!(p.x.is_finite() && p.y.is_finite());
            assert!(p.age < p.life);
        }
    }

    #[test]
    fn test_zero_size_surface_is_harmless() {
        let settings = Settings {
            seed: Some(9),
            ..Settings::default()
        };
        let mut sim = Simulation::new(0.0, 0.0, &settings, EventEmitter::detached());
        for _ in 0..200 {
            sim.step(0.05);
        }
        assert!(sim.particles().iter().all(|p| p.x.is_finite()));
    }
}
