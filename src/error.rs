//! Top-level error type for the fireworks binary and library.

use std::io;

use thiserror::Error;

use crate::color::ColorError;
use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum Error {
    /// Terminal or log file I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A configured color did not parse
    #[error("invalid color: {0}")]
    Color(#[from] ColorError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_bad_background_becomes_color_error() {
        let mut config = Config::default();
        config.display.background = "not-a-color".to_string();

        let err: Error = config.background().unwrap_err().into();
        assert!(matches!(err, Error::Color(ColorError::CssParse(_))));
        assert!(err.to_string().starts_with("invalid color: CSS parse error"));
    }
}
