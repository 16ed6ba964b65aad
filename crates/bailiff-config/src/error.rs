//! Configuration error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read bailiff config {}: {source}", path.display())]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{} is not a valid bailiff config: {source}", path.display())]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A merged value breaks a naming rule, e.g. an empty suffix.
    #[error("invalid bailiff config: {0}")]
    ValidationError(String),

    #[error("no user config directory is known for this platform")]
    NoUserConfigDir,
}
