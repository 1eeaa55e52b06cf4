//! Model collaborator errors.

use std::time::Duration;
use thiserror::Error;

/// Failure of a single think invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Transport-level failure reaching the model.
    #[error("network error: {0}")]
    Network(String),

    /// The model provider rejected or failed the request.
    #[error("provider error: {0}")]
    Provider(String),

    /// The model answered with something that is not a usable decision.
    #[error("invalid model response: {0}")]
    InvalidResponse(String),

    /// The model did not answer in time.
    #[error("model timed out after {}", humantime::format_duration(*.0))]
    Timeout(Duration),
}

impl ModelError {
    /// Check if a repeated think call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ModelError::Network(_) | ModelError::Timeout(_))
    }

    /// Get the error code suitable for logging or reporting.
    pub fn error_code(&self) -> &'static str {
        match self {
            ModelError::Network(_) => "MODEL_NETWORK",
            ModelError::Provider(_) => "MODEL_PROVIDER",
            ModelError::InvalidResponse(_) => "MODEL_INVALID_RESPONSE",
            ModelError::Timeout(_) => "MODEL_TIMEOUT",
        }
    }
}

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;
