//! Configuration loading for `fireworks.toml`.
//!
//! Search order: an explicit path, then
//! `$XDG_CONFIG_HOME/fireworks/fireworks.toml` (or
//! `~/.config/fireworks/fireworks.toml`), then built-in defaults. Command-line
//! flags are applied on top through [`Overrides`].
//!
//! ```toml
//! [display]
//! background = "1a1b26"   # or any CSS color, e.g. "midnightblue"
//! pixel_scale = 6.0
//! fps = 60
//! dark_threshold = 30
//!
//! [effect]
//! seed = 42
//! dimming = "literal"
//! initial_rockets = 3
//!
//! [log]
//! file = "/tmp/fireworks.log"
//! level = "debug"
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::{Color, ColorError, Dimming};
use crate::lifecycle::DEFAULT_DARK_THRESHOLD;
use crate::simulation::{Settings, INITIAL_ROCKETS};

pub const CONFIG_FILE: &str = "fireworks.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("failed to parse fireworks.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("config validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub effect: EffectConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Terminal background: bare `RRGGBB` or any CSS color
    pub background: String,
    /// Logical pixels per raster pixel (one half-block)
    pub pixel_scale: f32,
    /// Target frames per second
    pub fps: u32,
    /// Live entity count at which the background is forced dark
    pub dark_threshold: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            background: "000000".to_string(),
            pixel_scale: 6.0,
            fps: 60,
            dark_threshold: DEFAULT_DARK_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    /// Fixed random seed for reproducible shows
    pub seed: Option<u64>,
    pub dimming: Dimming,
    pub initial_rockets: usize,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            seed: None,
            dimming: Dimming::default(),
            initial_rockets: INITIAL_ROCKETS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log destination; logging is off without one
    pub file: Option<PathBuf>,
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: None,
            level: "info".to_string(),
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub background: Option<String>,
    pub seed: Option<u64>,
    pub fps: Option<u32>,
    pub dimming: Option<Dimming>,
    pub log_file: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl Config {
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(bg) = overrides.background {
            self.display.background = bg;
        }
        if let Some(seed) = overrides.seed {
            self.effect.seed = Some(seed);
        }
        if let Some(fps) = overrides.fps {
            self.display.fps = fps;
        }
        if let Some(dimming) = overrides.dimming {
            self.effect.dimming = dimming;
        }
        if let Some(file) = overrides.log_file {
            self.log.file = Some(file);
        }
        if let Some(level) = overrides.log_level {
            self.log.level = level;
        }
    }

    /// Every problem with the config, empty when valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if let Err(e) = self.background() {
            errors.push(format!("display.background: '{}': {e}", self.display.background));
        }
        if !(self.display.pixel_scale.is_finite() && self.display.pixel_scale > 0.0) {
            errors.push(format!(
                "display.pixel_scale: must be positive, got {}",
                self.display.pixel_scale
            ));
        }
        if !(1..=240).contains(&self.display.fps) {
            errors.push(format!(
                "display.fps: must be within 1..=240, got {}",
                self.display.fps
            ));
        }
        if self.log.level.parse::<tracing::Level>().is_err() {
            errors.push(format!("log.level: unknown level '{}'", self.log.level));
        }
        errors
    }

    pub fn background(&self) -> Result<(u8, u8, u8), ColorError> {
        background_color(&self.display.background).map(|c| c.to_rgb8())
    }

    pub fn settings(&self) -> Settings {
        Settings {
            seed: self.effect.seed,
            dimming: self.effect.dimming,
            initial_rockets: self.effect.initial_rockets,
        }
    }
}

/// Bare `RRGGBB` (the `--bg-color` form) gets its `#`; anything else is
/// parsed as a CSS color.
pub fn background_color(value: &str) -> Result<Color, ColorError> {
    let value = value.trim();
    if value.len() == 6 && value.chars().all(|c| c.is_ascii_hexdigit()) {
        return Color::parse(&format!("#{value}"));
    }
    Color::parse(value)
}

/// `$XDG_CONFIG_HOME/fireworks/fireworks.toml`, falling back to `~/.config`.
pub fn find_config() -> Option<PathBuf> {
    let base = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;
    let path = base.join("fireworks").join(CONFIG_FILE);
    path.exists().then_some(path)
}

/// Load from `path`, or from the discovered file, or fall back to defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };
    match path {
        Some(p) => load_config_file(&p),
        None => Ok(Config::default()),
    }
}

fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors));
    }
    Ok(config)
}
