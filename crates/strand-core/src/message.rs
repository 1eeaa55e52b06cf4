//! Conversation history entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Author of a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    /// Observation produced by dispatching a tool call.
    Tool,
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Identifier linking the request to its observation.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub params: Value,
}

impl ToolCall {
    /// Create a call with a fresh identifier.
    pub fn new(name: impl Into<String>, params: Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            params,
        }
    }

    /// Create a call with no parameters.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, Value::Object(Default::default()))
    }
}

/// How a dispatched tool call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStatus {
    Succeeded,
    /// The tool reported a failure or panicked.
    Failed,
    /// No tool with that name is available to the run.
    UnknownTool,
    /// Not executed because termination was requested earlier in the step.
    Skipped,
}

impl DispatchStatus {
    pub fn is_success(self) -> bool {
        matches!(self, DispatchStatus::Succeeded)
    }
}

/// Result metadata attached to an observation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub call_id: String,
    pub tool_name: String,
    pub status: DispatchStatus,
}

/// One entry of a run's append-only history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_result: Option<ToolCallResult>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    fn with_role(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_result: None,
            created_at: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content)
    }

    /// Assistant message carrying the tool calls it requested.
    pub fn assistant_with_calls<I>(content: impl Into<String>, calls: I) -> Self
    where
        I: IntoIterator<Item = ToolCall>,
    {
        Self {
            tool_calls: calls.into_iter().collect(),
            ..Self::with_role(Role::Assistant, content)
        }
    }

    /// Observation answering `call`.
    pub fn observation(call: &ToolCall, status: DispatchStatus, content: impl Into<String>) -> Self {
        Self {
            tool_result: Some(ToolCallResult {
                call_id: call.id.clone(),
                tool_name: call.name.clone(),
                status,
            }),
            ..Self::with_role(Role::Tool, content)
        }
    }

    pub fn is_observation(&self) -> bool {
        self.role == Role::Tool
    }

    /// Dispatch status if this is an observation.
    pub fn status(&self) -> Option<DispatchStatus> {
        self.tool_result.as_ref().map(|r| r.status)
    }
}
