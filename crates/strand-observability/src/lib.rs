//! Strand Observability
//!
//! Structured logging for the engine. Runs and steps are emitted as
//! `tracing` spans (`run`, `step`) by `strand-engine`; this crate installs
//! the subscriber that renders them.

pub mod trace;

pub use trace::init_tracing;

use serde::Deserialize;
use std::str::FromStr;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    Pretty,
    Compact,
}

impl FromStr for LogFormat {
    type Err = ObservabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(ObservabilityError::Config(format!(
                "unknown log format '{other}' (expected json, pretty or compact)"
            ))),
        }
    }
}

/// Logging configuration
///
/// `RUST_LOG`, when set, takes precedence over `level`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter directive, e.g. `info` or `strand_engine=debug`
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    pub fn from_toml(text: &str) -> Result<Self, ObservabilityError> {
        toml::from_str(text).map_err(|e| ObservabilityError::Config(e.to_string()))
    }

    /// Apply `STRAND_LOG_LEVEL` and `STRAND_LOG_FORMAT` from the environment.
    pub fn with_env_overrides(self) -> Result<Self, ObservabilityError> {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary lookup.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self, ObservabilityError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("STRAND_LOG_LEVEL") {
            self.level = level;
        }
        if let Some(format) = lookup("STRAND_LOG_FORMAT") {
            self.format = format.parse()?;
        }
        Ok(self)
    }
}

/// Observability setup errors
#[derive(thiserror::Error, Debug)]
pub enum ObservabilityError {
    #[error("Tracing initialization failed: {0}")]
    TracingInit(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
