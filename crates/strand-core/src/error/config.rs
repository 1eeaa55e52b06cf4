//! Configuration loading and validation errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while building a run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration text is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// An environment override could not be parsed.
    #[error("invalid value for {name}: '{value}' ({reason})")]
    InvalidEnvVar {
        name: String,
        value: String,
        reason: String,
    },

    /// A value is outside its allowed range.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
