//! Run configuration.
//!
//! Values are resolved in three layers: a TOML document (or defaults), then
//! `STRAND_*` environment overrides, then explicit builder calls.

use crate::error::{ConfigError, ConfigResult};
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::time::Duration;

/// Default maximum number of steps per run.
pub const DEFAULT_STEP_BUDGET: u32 = 20;

/// Default wall-clock bound of a streamed run.
pub const DEFAULT_STREAM_TIMEOUT: Duration = Duration::from_secs(180);

const DEFAULT_NAME: &str = "strand";

/// Recognized options of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Identity used in logs and results.
    pub name: String,
    pub system_prompt: String,
    /// Appended as a user message at the start of every step when non-empty.
    pub next_step_prompt: String,
    /// Hard upper bound on completed steps. Must be positive.
    pub step_budget: u32,
    /// Additional think attempts after a failed one before the run errors.
    pub think_retries: u32,
    /// Wall-clock bound applied by the streaming adapter.
    pub stream_timeout: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            system_prompt: String::new(),
            next_step_prompt: String::new(),
            step_budget: DEFAULT_STEP_BUDGET,
            think_retries: 0,
            stream_timeout: DEFAULT_STREAM_TIMEOUT,
        }
    }
}

/// On-disk shape of [`RunConfig`].
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RunConfigFile {
    name: Option<String>,
    system_prompt: Option<String>,
    next_step_prompt: Option<String>,
    step_budget: Option<u32>,
    think_retries: Option<u32>,
    stream_timeout_secs: Option<u64>,
}

impl RunConfig {
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::default()
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    ///
    /// ```rust
    /// use strand_core::RunConfig;
    ///
    /// let config = RunConfig::from_toml(r#"
    ///     name = "researcher"
    ///     step_budget = 5
    /// "#).unwrap();
    /// assert_eq!(config.step_budget, 5);
    /// ```
    pub fn from_toml(text: &str) -> ConfigResult<Self> {
        let file: RunConfigFile = toml::from_str(text)?;
        let defaults = RunConfig::default();
        let config = RunConfig {
            name: file.name.unwrap_or(defaults.name),
            system_prompt: file.system_prompt.unwrap_or(defaults.system_prompt),
            next_step_prompt: file.next_step_prompt.unwrap_or(defaults.next_step_prompt),
            step_budget: file.step_budget.unwrap_or(defaults.step_budget),
            think_retries: file.think_retries.unwrap_or(defaults.think_retries),
            stream_timeout: file
                .stream_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.stream_timeout),
        };
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Apply `STRAND_*` environment variables on top of `self`.
    pub fn with_env_overrides(self) -> ConfigResult<Self> {
        self.with_overrides_from(|key| env::var(key).ok())
    }

    /// Apply overrides using `lookup` as the variable source.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("STRAND_NAME") {
            self.name = name;
        }
        if let Some(prompt) = lookup("STRAND_SYSTEM_PROMPT") {
            self.system_prompt = prompt;
        }
        if let Some(prompt) = lookup("STRAND_NEXT_STEP_PROMPT") {
            self.next_step_prompt = prompt;
        }
        if let Some(budget) = parse_u32(&lookup, "STRAND_STEP_BUDGET")? {
            self.step_budget = budget;
        }
        if let Some(retries) = parse_u32(&lookup, "STRAND_THINK_RETRIES")? {
            self.think_retries = retries;
        }
        if let Some(value) = lookup("STRAND_STREAM_TIMEOUT") {
            self.stream_timeout =
                humantime::parse_duration(&value).map_err(|e| ConfigError::InvalidEnvVar {
                    name: "STRAND_STREAM_TIMEOUT".to_string(),
                    value: value.clone(),
                    reason: e.to_string(),
                })?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Validation("name must not be empty".into()));
        }
        if self.step_budget == 0 {
            return Err(ConfigError::Validation(
                "step_budget must be a positive integer".into(),
            ));
        }
        if self.stream_timeout.is_zero() {
            return Err(ConfigError::Validation(
                "stream_timeout must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

fn parse_u32<F>(lookup: &F, key: &str) -> ConfigResult<Option<u32>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidEnvVar {
                name: key.to_string(),
                value,
                reason: e.to_string(),
            }),
        None => Ok(None),
    }
}

/// Builder for [`RunConfig`].
#[derive(Debug, Clone, Default)]
pub struct RunConfigBuilder {
    config: RunConfig,
}

impl RunConfigBuilder {
    /// Start from an existing configuration (e.g. one loaded from TOML).
    pub fn from_config(config: RunConfig) -> Self {
        Self { config }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    pub fn next_step_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.next_step_prompt = prompt.into();
        self
    }

    pub fn step_budget(mut self, budget: u32) -> Self {
        self.config.step_budget = budget;
        self
    }

    pub fn think_retries(mut self, retries: u32) -> Self {
        self.config.think_retries = retries;
        self
    }

    pub fn stream_timeout(mut self, timeout: Duration) -> Self {
        self.config.stream_timeout = timeout;
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> ConfigResult<RunConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
