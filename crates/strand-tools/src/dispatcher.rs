//! Tool dispatch with failure containment.
//!
//! Whatever a tool does, dispatching it yields exactly one observation. Tool
//! failures, panics and unknown names all become observation text that the
//! model sees on its next think call.

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use strand_core::{DispatchStatus, ExecutionResult, Message, ToolCall};
use tracing::{debug, warn};

use crate::registry::ToolRegistry;

/// Observation produced for one tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub status: DispatchStatus,
    /// History entry to append; role is always `Tool`.
    pub message: Message,
}

impl Observation {
    pub fn new(call: &ToolCall, status: DispatchStatus, content: impl Into<String>) -> Self {
        Self {
            status,
            message: Message::observation(call, status, content),
        }
    }

    pub fn content(&self) -> &str {
        &self.message.content
    }
}

/// Resolves requested names against a registry and invokes the tool.
///
/// Never retries: a tool that wants retries implements them itself.
#[derive(Debug, Clone)]
pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
}

impl ToolDispatcher {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub async fn dispatch(&self, call: &ToolCall) -> Observation {
        let Some(tool) = self.registry.get(&call.name) else {
            warn!(tool.name = %call.name, "model requested an unknown tool");
            let available: Vec<&str> = self.registry.names().collect();
            let content = if available.is_empty() {
                format!("Unknown tool '{}'. No tools are available.", call.name)
            } else {
                format!(
                    "Unknown tool '{}'. Available tools: {}",
                    call.name,
                    available.join(", ")
                )
            };
            return Observation::new(call, DispatchStatus::UnknownTool, content);
        };

        debug!(tool.name = %call.name, call.id = %call.id, "invoking tool");
        let outcome = AssertUnwindSafe(tool.invoke(call.params.clone()))
            .catch_unwind()
            .await;

        match outcome {
            Ok(ExecutionResult::Success { output }) => {
                debug!(tool.name = %call.name, output.len = output.len(), "tool succeeded");
                Observation::new(call, DispatchStatus::Succeeded, output)
            }
            Ok(ExecutionResult::Failure { reason }) => {
                warn!(tool.name = %call.name, error = %reason, "tool failed");
                Observation::new(
                    call,
                    DispatchStatus::Failed,
                    format!("Tool '{}' failed: {}", call.name, reason),
                )
            }
            Err(panic) => {
                let detail = panic_message(panic.as_ref());
                warn!(tool.name = %call.name, panic = %detail, "tool panicked");
                Observation::new(
                    call,
                    DispatchStatus::Failed,
                    format!("Tool '{}' failed: Internal error: {}", call.name, detail),
                )
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "tool panicked".to_string()
    }
}
