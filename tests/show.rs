use fireworks::color::Color;
use fireworks::explosion::EventEmitter;
use fireworks::lifecycle::{DEFAULT_DARK_THRESHOLD, Presentation, Show};
use fireworks::raster::Canvas;
use fireworks::scheduler::MAX_FRAME_DT;
use fireworks::surface::Surface;
use fireworks::{EXPLOSION_EVENT, Settings, Simulation};

fn settings(seed: u64) -> Settings {
    Settings {
        seed: Some(seed),
        ..Settings::default()
    }
}

fn show(seed: u64) -> Show<Canvas> {
    let canvas = Canvas::new(160, 96, 6.0);
    let presentation = Presentation::new((0, 0, 0), DEFAULT_DARK_THRESHOLD);
    Show::new(
        canvas,
        &settings(seed),
        presentation,
        EventEmitter::detached(),
    )
}

#[test]
fn explode_scenario_emits_one_event() {
    let (events, rx) = EventEmitter::bounded(8);
    let settings = Settings {
        initial_rockets: 0,
        ..settings(1)
    };
    let mut sim = Simulation::new(800.0, 600.0, &settings, events);

    let color = Color::parse("hsl(200,90%,60%)").unwrap();
    let event = sim.explode_n(100.0, 100.0, color, 1.0, 100);

    assert_eq!(sim.particles().len(), 100);
    let received: Vec<_> = rx.try_iter().collect();
    assert_eq!(received, vec![event]);
    assert_eq!(received[0].name(), EXPLOSION_EVENT);
    assert_eq!(received[0].count, 100);
    assert_eq!(received[0].intensity, 1.25);
    assert_eq!(received[0].depth, 1.0);
}

#[test]
fn stopped_simulation_never_launches() {
    let mut sim = Simulation::new(800.0, 600.0, &settings(2), EventEmitter::detached());
    sim.stop();
    sim.set_launch_timer(0.0);
    for _ in 0..100 {
        sim.step(MAX_FRAME_DT);
    }
    assert!(sim.rockets().is_empty());
}

#[test]
fn stop_then_start_ends_visible_and_empty() {
    let mut show = show(3);
    show.frame(0.0);
    show.frame(16.0);

    show.stop();
    show.start();

    assert!(show.is_running());
    assert_eq!(show.simulation().entity_count(), 0);
    assert!(show.presentation().is_visible());
    assert_eq!(show.presentation().opacity(), 1.0);

    // The cancelled teardown must not hide the surface later on.
    for i in 2..120 {
        show.frame(i as f64 * 16.0);
    }
    assert!(show.presentation().is_visible());
    assert_eq!(show.presentation().opacity(), 1.0);
}

#[test]
fn stop_fades_then_hides_and_darkens() {
    let canvas = Canvas::new(40, 24, 6.0);
    let presentation = Presentation::new((30, 30, 60), DEFAULT_DARK_THRESHOLD);
    let mut show = Show::new(canvas, &settings(4), presentation, EventEmitter::detached());

    show.frame(0.0);
    show.frame(16.0);
    show.stop();
    show.stop();
    assert!(!show.is_running());
    assert_eq!(show.simulation().entity_count(), 0);

    show.frame(32.0);
    show.frame(432.0);
    let mid = show.presentation().opacity();
    assert!(mid > 0.0 && mid < 1.0);
    assert!(show.presentation().is_visible());

    show.frame(940.0);
    assert!(!show.presentation().is_visible());
    assert_eq!(show.presentation().background(), (0, 0, 0));

    show.start();
    assert!(show.presentation().is_visible());
    assert_eq!(show.presentation().background(), (30, 30, 60));
}

#[test]
fn first_frame_only_sets_the_baseline() {
    let mut show = show(5);
    let before: Vec<f32> = show.simulation().rockets().iter().map(|r| r.y).collect();
    show.frame(5000.0);
    let after: Vec<f32> = show.simulation().rockets().iter().map(|r| r.y).collect();
    assert_eq!(before, after);

    show.frame(5016.0);
    assert!(show.simulation().rockets()[0].y < before[0]);
}

#[test]
fn long_show_stays_finite_and_paints() {
    let mut show = show(6);
    let mut ts = 0.0;
    for _ in 0..3000 {
        show.frame(ts);
        ts += 33.0;
    }
    let sim = show.simulation();
    assert!(sim.particles().iter().all(|p| p.x.is_finite() && p.y.is_finite()));
    assert!(sim.rockets().iter().all(|r| r.x.is_finite() && r.y.is_finite()));
    assert!(show.surface().pixels().iter().all(|px| px.iter().all(|c| c.is_finite())));
}

#[test]
fn resize_keeps_entities_in_flight() {
    let mut show = show(7);
    show.frame(0.0);
    show.frame(16.0);
    let count = show.simulation().entity_count();

    show.resize_surface(|canvas| canvas.resize(80, 48));

    assert_eq!(show.simulation().entity_count(), count);
    assert_eq!(show.simulation().size(), (480.0, 288.0));
    assert_eq!(show.surface().width(), 480.0);
}

#[test]
fn zero_size_surface_degrades_gracefully() {
    let canvas = Canvas::new(0, 0, 6.0);
    let presentation = Presentation::new((0, 0, 0), DEFAULT_DARK_THRESHOLD);
    let mut show = Show::new(canvas, &settings(8), presentation, EventEmitter::detached());
    for i in 0..200 {
        show.frame(i as f64 * 50.0);
    }
    assert!(show.surface().pixels().is_empty());
}
