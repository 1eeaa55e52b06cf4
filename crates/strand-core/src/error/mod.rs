//! Error Types
//!
//! Structured errors for every concern the engine touches. Expected failures of
//! collaborators (tools, models) are *not* surfaced through these types to the
//! caller of a run; they are folded into history and the run's terminal state.
//! These errors describe preconditions, configuration and construction problems.
//!
//! - `model`: model collaborator failures
//! - `tool`: registry, remote provider and human channel failures
//! - `config`: configuration loading and validation
//! - `run`: lifecycle transitions, engine preconditions and terminal failures

mod config;
mod model;
mod run;
mod tool;

pub use config::{ConfigError, ConfigResult};
pub use model::{ModelError, ModelResult};
pub use run::{EngineError, EngineResult, FailureKind, RunFailure, StateError};
pub use tool::{ChannelError, ProviderError, RegistryError};
