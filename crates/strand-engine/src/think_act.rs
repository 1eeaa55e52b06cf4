//! The think/act capability a run is parameterized by.

use async_trait::async_trait;
use std::sync::Arc;
use strand_core::{
    DeltaSink, Message, ModelCollaborator, ModelError, NonEmptyVec, ThinkDecision, ThinkRequest,
    ToolCall, ToolDescriptor,
};
use strand_tools::{Observation, ToolDispatcher, ToolRegistry};

use crate::termination::TerminationDetector;

/// Input of a think call.
#[derive(Debug, Clone, Copy)]
pub struct ThinkContext<'a> {
    pub system_prompt: &'a str,
    pub history: &'a [Message],
}

/// Outcome of an act call.
#[derive(Debug, Clone, Default)]
pub struct ActReport {
    /// One observation per requested call, in request order.
    pub observations: Vec<Observation>,
    /// Termination was requested during this act.
    pub terminated: bool,
}

/// Two operations: decide, then carry out the decision.
///
/// Implementations are shared read-only across concurrent runs. Both
/// operations are suspension points the engine may abandon on cancellation.
#[async_trait]
pub trait ThinkAct: Send + Sync {
    /// Decide whether to act. Text deltas go to `sink` when streaming.
    async fn think(
        &self,
        ctx: ThinkContext<'_>,
        sink: &DeltaSink,
    ) -> Result<ThinkDecision, ModelError>;

    /// Run the requested calls in order. Must not fail: every call yields an
    /// observation.
    async fn act(&self, calls: &NonEmptyVec<ToolCall>) -> ActReport;
}

/// Default [`ThinkAct`]: a model that requests tools from a registry.
pub struct ToolCallingAgent {
    model: Arc<dyn ModelCollaborator>,
    dispatcher: ToolDispatcher,
    detector: TerminationDetector,
    descriptors: Vec<ToolDescriptor>,
}

impl ToolCallingAgent {
    pub fn new(model: Arc<dyn ModelCollaborator>, tools: Arc<ToolRegistry>) -> Self {
        let detector = TerminationDetector::new();
        let mut descriptors = tools.descriptors();
        descriptors.push(detector.descriptor());
        Self {
            model,
            dispatcher: ToolDispatcher::new(tools),
            detector,
            descriptors,
        }
    }

    /// Everything offered to the model: registered tools plus `terminate`.
    pub fn descriptors(&self) -> &[ToolDescriptor] {
        &self.descriptors
    }
}

#[async_trait]
impl ThinkAct for ToolCallingAgent {
    async fn think(
        &self,
        ctx: ThinkContext<'_>,
        sink: &DeltaSink,
    ) -> Result<ThinkDecision, ModelError> {
        let request = ThinkRequest {
            system_prompt: ctx.system_prompt,
            history: ctx.history,
            tools: &self.descriptors,
        };
        if sink.is_enabled() {
            self.model.think_streaming(request, sink).await
        } else {
            self.model.think(request).await
        }
    }

    async fn act(&self, calls: &NonEmptyVec<ToolCall>) -> ActReport {
        let mut report = ActReport::default();
        for call in calls {
            let observation = if report.terminated {
                self.detector.skip(call)
            } else if self.detector.is_terminate(call) {
                report.terminated = true;
                self.detector.intercept(call)
            } else {
                self.dispatcher.dispatch(call).await
            };
            report.observations.push(observation);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::sync::Mutex;
    use strand_core::{DispatchStatus, ExecutionResult, Tool};

    struct Recorder {
        name: &'static str,
        seen: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl Tool for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        async fn invoke(&self, _params: Value) -> ExecutionResult {
            self.seen.lock().unwrap().push(self.name);
            ExecutionResult::success(format!("{} done", self.name))
        }
    }

    struct Silent;

    #[async_trait]
    impl ModelCollaborator for Silent {
        async fn think(&self, request: ThinkRequest<'_>) -> Result<ThinkDecision, ModelError> {
            Ok(ThinkDecision::finish(format!("{} tools", request.tools.len())))
        }
    }

    fn agent(seen: &Arc<Mutex<Vec<&'static str>>>) -> ToolCallingAgent {
        let registry = ToolRegistry::new()
            .with_tool(Arc::new(Recorder { name: "a", seen: seen.clone() }))
            .and_then(|r| r.with_tool(Arc::new(Recorder { name: "b", seen: seen.clone() })))
            .unwrap();
        ToolCallingAgent::new(Arc::new(Silent), Arc::new(registry))
    }

    #[tokio::test]
    async fn offers_terminate_with_registered_tools() {
        let seen = Arc::default();
        let agent = agent(&seen);
        let names: Vec<_> = agent.descriptors().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "terminate"]);

        let ctx = ThinkContext { system_prompt: "", history: &[] };
        let decision = agent.think(ctx, &DeltaSink::disabled()).await.unwrap();
        assert_eq!(decision.content(), "3 tools");
    }

    #[tokio::test]
    async fn calls_run_in_request_order() {
        let seen = Arc::default();
        let agent = agent(&seen);
        let calls = NonEmptyVec::new(ToolCall::named("b"), vec![ToolCall::named("a")]);

        let report = agent.act(&calls).await;

        assert!(!report.terminated);
        assert_eq!(*seen.lock().unwrap(), ["b", "a"]);
        let contents: Vec<_> = report.observations.iter().map(|o| o.content()).collect();
        assert_eq!(contents, ["b done", "a done"]);
    }

    #[tokio::test]
    async fn terminate_short_circuits_later_calls() {
        let seen = Arc::default();
        let agent = agent(&seen);
        let calls = NonEmptyVec::new(
            ToolCall::named("a"),
            vec![ToolCall::named("terminate"), ToolCall::named("b")],
        );

        let report = agent.act(&calls).await;

        assert!(report.terminated);
        assert_eq!(*seen.lock().unwrap(), ["a"]);
        let statuses: Vec<_> = report.observations.iter().map(|o| o.status).collect();
        assert_eq!(
            statuses,
            [
                DispatchStatus::Succeeded,
                DispatchStatus::Succeeded,
                DispatchStatus::Skipped
            ]
        );
    }
}
