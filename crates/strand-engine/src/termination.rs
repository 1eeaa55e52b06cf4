//! The reserved stop capability.
//!
//! `terminate` is offered to the model on every think call but never goes
//! through the registry. Requesting it is a state change: the run finishes
//! after the current step, and calls queued after it in the same step are
//! skipped.

use serde_json::{Value, json};
use strand_core::{DispatchStatus, TERMINATE_TOOL, ToolCall, ToolDescriptor};
use strand_tools::Observation;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default)]
pub struct TerminationDetector;

impl TerminationDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn is_terminate(&self, call: &ToolCall) -> bool {
        call.name == TERMINATE_TOOL
    }

    /// Accept a termination request and produce its observation.
    ///
    /// Parameters are not required; anything supplied is only logged.
    pub fn intercept(&self, call: &ToolCall) -> Observation {
        if has_params(&call.params) {
            debug!(params = %call.params, "ignoring parameters passed to terminate");
        }
        info!(call.id = %call.id, "termination requested");
        Observation::new(
            call,
            DispatchStatus::Succeeded,
            "Task marked as finished; the run will stop after this step.",
        )
    }

    /// Observation for a call that was not executed because termination won.
    pub fn skip(&self, call: &ToolCall) -> Observation {
        debug!(tool.name = %call.name, "skipping call queued after terminate");
        Observation::new(
            call,
            DispatchStatus::Skipped,
            format!(
                "Skipped '{}': termination was requested earlier in this step.",
                call.name
            ),
        )
    }

    /// Descriptor offered to the model alongside the registered tools.
    pub fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: TERMINATE_TOOL.to_string(),
            description: "Stop the run. Call this when the goal has been met or when no further \
                          progress is possible."
                .to_string(),
            parameters: json!({ "type": "object", "properties": {} }),
        }
    }
}

fn has_params(params: &Value) -> bool {
    match params {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}
