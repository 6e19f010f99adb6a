use clap::Parser;
use crossterm::{
    cursor::{Hide, Show as ShowCursor},
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::fs::OpenOptions;
use std::io::{stdout, BufWriter, Stdout, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use fireworks::color::Dimming;
use fireworks::config::{self, Config, ConfigError, LogConfig, Overrides};
use fireworks::explosion::EventEmitter;
use fireworks::lifecycle::{Presentation, Show};
use fireworks::raster::Canvas;
use fireworks::terminal::{SkyGlow, TerminalPresenter, View};

/// Unread explosion events kept for the sky glow.
const EVENT_BACKLOG: usize = 64;

/// Colorful fireworks in your terminal
#[derive(Parser)]
#[command(name = "fireworks", version)]
#[command(after_help = "Keys: s = stop, g = start, space = toggle, q / Esc / Ctrl+C = exit")]
struct Args {
    /// Config file (default: $XDG_CONFIG_HOME/fireworks/fireworks.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Background color: hex like 1a1b26, or any CSS color
    #[arg(long = "bg-color", value_name = "COLOR")]
    bg_color: Option<String>,

    /// Random seed for a reproducible show
    #[arg(long)]
    seed: Option<u64>,

    /// Target frames per second
    #[arg(long)]
    fps: Option<u32>,

    /// How distant particles are dimmed
    #[arg(long, value_enum)]
    dimming: Option<Dimming>,

    /// Write logs to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

enum Control {
    Continue,
    Quit,
}

fn load_config(args: Args) -> Result<Config, ConfigError> {
    let mut config = config::load_config(args.config.as_deref())?;
    config.apply(Overrides {
        background: args.bg_color,
        seed: args.seed,
        fps: args.fps,
        dimming: args.dimming,
        log_file: args.log_file,
        log_level: args.log_level,
    });

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors));
    }
    Ok(config)
}

/// The terminal belongs to the effect, so logs only go to a file.
fn init_logging(log: &LogConfig) -> std::io::Result<()> {
    let Some(path) = &log.file else {
        return Ok(());
    };
    let level: tracing::Level = log.level.parse().unwrap_or(tracing::Level::INFO);
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn handle_event(
    event: Event,
    show: &mut Show<Canvas>,
    stdout: &mut BufWriter<Stdout>,
) -> fireworks::Result<Control> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(Control::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Ok(Control::Quit);
            }
            KeyCode::Char('s') => show.stop(),
            KeyCode::Char('g') => show.start(),
            KeyCode::Char(' ') => show.toggle(),
            _ => {}
        },
        Event::Resize(cols, rows) => {
            show.resize_surface(|canvas| canvas.resize(cols as usize, rows as usize * 2));
            execute!(stdout, Clear(ClearType::All))?;
        }
        _ => {}
    }
    Ok(Control::Continue)
}

fn run_show(stdout: &mut BufWriter<Stdout>, config: &Config) -> fireworks::Result<()> {
    let (cols, rows) = terminal::size()?;
    let canvas = Canvas::new(cols as usize, rows as usize * 2, config.display.pixel_scale);

    let (events, explosions) = EventEmitter::bounded(EVENT_BACKLOG);
    let presentation = Presentation::new(config.background()?, config.display.dark_threshold);
    let mut show = Show::new(canvas, &config.settings(), presentation, events);

    let mut presenter = TerminalPresenter::new(cols as usize, rows as usize);
    let mut glow = SkyGlow::default();

    let frame_budget = Duration::from_secs_f64(1.0 / config.display.fps as f64);
    let clock = Instant::now();
    let mut last_frame = clock;

    loop {
        let timeout = frame_budget.saturating_sub(last_frame.elapsed());
        if event::poll(timeout)? {
            if let Control::Quit = handle_event(event::read()?, &mut show, stdout)? {
                return Ok(());
            }
            if last_frame.elapsed() < frame_budget {
                continue;
            }
        }

        let now = Instant::now();
        let frame_time = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;

        show.frame(now.duration_since(clock).as_secs_f64() * 1000.0);

        for explosion in explosions.try_iter() {
            glow.react(&explosion);
        }
        glow.decay(frame_time);

        let presentation = show.presentation();
        let view = View {
            background: glow.tint(presentation.background()),
            opacity: presentation.opacity(),
            visible: presentation.is_visible(),
        };
        presenter.present(show.surface(), view, stdout)?;
    }
}

fn run(config: &Config) -> fireworks::Result<()> {
    let mut stdout = BufWriter::with_capacity(1024 * 64, stdout());

    terminal::enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, Hide, Clear(ClearType::All))?;

    let result = run_show(&mut stdout, config);

    // Restore the terminal even when the show failed.
    let restored = execute!(stdout, ShowCursor, LeaveAlternateScreen)
        .and_then(|()| terminal::disable_raw_mode())
        .and_then(|()| stdout.flush());

    result?;
    restored?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("fireworks: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.log) {
        eprintln!("fireworks: cannot open log file: {e}");
        return ExitCode::FAILURE;
    }

    tracing::info!(fps = config.display.fps, seed = ?config.effect.seed, "starting");
    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("fireworks: {e}");
            ExitCode::FAILURE
        }
    }
}
