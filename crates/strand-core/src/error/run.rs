//! Run lifecycle errors and terminal failure descriptions.

use crate::state::RunState;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::{ConfigError, RegistryError};

/// Attempted lifecycle transition that the state machine forbids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid run state transition: {from} -> {to}")]
pub struct StateError {
    pub from: RunState,
    pub to: RunState,
}

/// Errors that prevent a run from starting or from being observed to its end.
///
/// Model and tool failures never appear here; they are reported through
/// [`RunFailure`] on the final result.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("goal must not be empty")]
    EmptyGoal,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    State(#[from] StateError),

    /// A tool handed to the engine builder could not be registered.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The engine's own machinery failed (e.g. a run task could not be joined).
    #[error("internal engine error: {0}")]
    Internal(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Why a run ended in [`RunState::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Think failed and no retries were left.
    ModelInvocation,
    /// A fault inside the engine's own control logic.
    Internal,
    /// Cancelled by the caller or a disconnected subscriber.
    Cancelled,
    /// The streaming wall-clock timeout elapsed.
    TimedOut,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::ModelInvocation => "model_invocation",
            FailureKind::Internal => "internal",
            FailureKind::Cancelled => "cancelled",
            FailureKind::TimedOut => "timed_out",
        };
        f.write_str(s)
    }
}

/// Description of an `Error` terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl RunFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn cancelled() -> Self {
        Self::new(FailureKind::Cancelled, "run cancelled")
    }
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
