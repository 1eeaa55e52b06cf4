//! Tool contract and execution outcomes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Categorized failure reasons for tool execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FailureReason {
    /// Invalid or malformed parameters, or input that failed validation.
    InvalidInput { message: String },
    /// Required resource not found (file, URL, record).
    NotFound { resource: String },
    PermissionDenied { message: String },
    NetworkError { message: String },
    IoError { message: String },
    /// The tool's own deadline elapsed.
    Timeout { operation: String },
    /// Unexpected state inside the tool, including panics caught by the dispatcher.
    InternalError { message: String },
    /// Tool-specific failure category.
    Custom { category: String, message: String },
}

impl FailureReason {
    /// Human-readable description.
    pub fn message(&self) -> String {
        match self {
            FailureReason::InvalidInput { message } => format!("Invalid input: {message}"),
            FailureReason::NotFound { resource } => format!("Not found: {resource}"),
            FailureReason::PermissionDenied { message } => {
                format!("Permission denied: {message}")
            }
            FailureReason::NetworkError { message } => format!("Network error: {message}"),
            FailureReason::IoError { message } => format!("I/O error: {message}"),
            FailureReason::Timeout { operation } => format!("Timeout: {operation}"),
            FailureReason::InternalError { message } => format!("Internal error: {message}"),
            FailureReason::Custom { category, message } => format!("{category}: {message}"),
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

/// Outcome of invoking a tool: textual output or a typed failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionResult {
    Success { output: String },
    Failure { reason: FailureReason },
}

impl ExecutionResult {
    pub fn success(output: impl Into<String>) -> Self {
        ExecutionResult::Success {
            output: output.into(),
        }
    }

    pub fn failed(reason: FailureReason) -> Self {
        ExecutionResult::Failure { reason }
    }

    /// Shorthand for an [`FailureReason::InvalidInput`] failure.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::failed(FailureReason::InvalidInput {
            message: message.into(),
        })
    }

    /// Shorthand for an [`FailureReason::InternalError`] failure.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::failed(FailureReason::InternalError {
            message: message.into(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success { .. })
    }

    /// Output on success, failure description otherwise.
    pub fn output(&self) -> String {
        match self {
            ExecutionResult::Success { output } => output.clone(),
            ExecutionResult::Failure { reason } => reason.message(),
        }
    }

    pub fn failure_reason(&self) -> Option<&FailureReason> {
        match self {
            ExecutionResult::Success { .. } => None,
            ExecutionResult::Failure { reason } => Some(reason),
        }
    }
}

/// What the model is told about a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    /// JSON schema of the accepted parameters.
    pub parameters: Value,
}

/// An externally implemented capability the engine can invoke by name.
///
/// Implementations are shared read-only across concurrent runs, so any
/// internal state must be synchronized by the tool itself.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use serde_json::Value;
/// use strand_core::{ExecutionResult, Tool};
///
/// struct Echo;
///
/// #[async_trait]
/// impl Tool for Echo {
///     fn name(&self) -> &str {
///         "echo"
///     }
///
///     async fn invoke(&self, params: Value) -> ExecutionResult {
///         ExecutionResult::success(params.to_string())
///     }
/// }
/// ```
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name within a run's tool set; matched case-sensitively.
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// JSON schema for `invoke` parameters.
    fn parameters(&self) -> Value {
        json!({ "type": "object" })
    }

    /// Execute with the parameters the model supplied.
    ///
    /// Expected failures are returned as [`ExecutionResult::Failure`]; any
    /// retrying is the tool's own business.
    async fn invoke(&self, params: Value) -> ExecutionResult;

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;

    #[async_trait]
    impl Tool for Upper {
        fn name(&self) -> &str {
            "upper"
        }

        fn description(&self) -> &str {
            "Uppercase the `text` parameter"
        }

        async fn invoke(&self, params: Value) -> ExecutionResult {
            match params.get("text").and_then(Value::as_str) {
                Some(text) => ExecutionResult::success(text.to_uppercase()),
                None => ExecutionResult::invalid_input("missing 'text'"),
            }
        }
    }

    #[tokio::test]
    async fn invoke_returns_typed_outcome() {
        let ok = Upper.invoke(json!({"text": "abc"})).await;
        assert_eq!(ok, ExecutionResult::success("ABC"));

        let err = Upper.invoke(json!({})).await;
        assert!(!err.is_success());
        assert_eq!(err.output(), "Invalid input: missing 'text'");
    }

    #[test]
    fn descriptor_uses_defaults() {
        let d = Upper.descriptor();
        assert_eq!(d.name, "upper");
        assert_eq!(d.parameters, json!({"type": "object"}));
    }

    #[test]
    fn failure_reason_is_tagged() {
        let json = serde_json::to_value(FailureReason::Timeout {
            operation: "fetch".into(),
        })
        .unwrap();
        assert_eq!(json["type"], "timeout");
        assert_eq!(json["operation"], "fetch");
    }
}
