//! # Mock Tools for Testing
//!
//! Tools that return predictable results and record how they were called.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use strand_core::{ExecutionResult, Tool};

use crate::locked;

/// A mock tool that returns predefined results based on its parameters
///
/// Clones share call tracking, so a test can register one clone and inspect
/// another.
#[derive(Debug, Clone)]
pub struct MockTool {
    name: String,
    description: String,
    responses: Vec<(Value, ExecutionResult)>,
    default_response: Option<ExecutionResult>,
    delay: Option<Duration>,
    panic_message: Option<String>,
    call_history: Arc<Mutex<Vec<Value>>>,
}

impl MockTool {
    /// Create a new mock tool with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            responses: Vec::new(),
            default_response: None,
            delay: None,
            panic_message: None,
            call_history: Arc::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a response for specific parameters
    pub fn with_response(mut self, params: Value, output: impl Into<String>) -> Self {
        self.responses
            .push((params, ExecutionResult::success(output)));
        self
    }

    /// Add a failure for specific parameters
    pub fn with_failure(mut self, params: Value, error: impl Into<String>) -> Self {
        self.responses
            .push((params, ExecutionResult::internal(error)));
        self
    }

    /// Set a default response for unmatched parameters
    pub fn with_default_response(mut self, output: impl Into<String>) -> Self {
        self.default_response = Some(ExecutionResult::success(output));
        self
    }

    /// Set a default failure for unmatched parameters
    pub fn with_default_failure(mut self, error: impl Into<String>) -> Self {
        self.default_response = Some(ExecutionResult::internal(error));
        self
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Panic on every call
    pub fn panicking(mut self, message: impl Into<String>) -> Self {
        self.panic_message = Some(message.into());
        self
    }

    pub fn call_count(&self) -> usize {
        locked(&self.call_history).len()
    }

    /// Parameters of every call so far, in order
    pub fn call_history(&self) -> Vec<Value> {
        locked(&self.call_history).clone()
    }

    pub fn was_called_with(&self, params: &Value) -> bool {
        locked(&self.call_history).contains(params)
    }

    pub fn reset(&self) {
        locked(&self.call_history).clear();
    }
}

#[async_trait]
impl Tool for MockTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn invoke(&self, params: Value) -> ExecutionResult {
        locked(&self.call_history).push(params.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.panic_message {
            panic!("{message}");
        }

        if let Some((_, response)) = self.responses.iter().find(|(p, _)| *p == params) {
            response.clone()
        } else if let Some(default) = &self.default_response {
            default.clone()
        } else {
            ExecutionResult::success(format!("Mock response for: {params}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn matches_params_then_default() {
        let tool = MockTool::new("weather")
            .with_response(json!({"city": "Kyiv"}), "sunny")
            .with_failure(json!({"city": "Atlantis"}), "no such city")
            .with_default_response("cloudy");
        let probe = tool.clone();

        assert_eq!(tool.invoke(json!({"city": "Kyiv"})).await.output(), "sunny");
        assert!(!tool.invoke(json!({"city": "Atlantis"})).await.is_success());
        assert_eq!(tool.invoke(json!({"city": "Oslo"})).await.output(), "cloudy");

        assert_eq!(probe.call_count(), 3);
        assert!(probe.was_called_with(&json!({"city": "Oslo"})));
        probe.reset();
        assert_eq!(tool.call_count(), 0);
    }

    #[tokio::test]
    async fn falls_back_to_echoing_params() {
        let tool = MockTool::new("echo");
        let result = tool.invoke(json!("hi")).await;
        assert_eq!(result.output(), "Mock response for: \"hi\"");
    }
}
