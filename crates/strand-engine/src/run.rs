//! Run State and Step Engine.
//!
//! A [`Run`] is created per execution, owns its history and step counter, and
//! is consumed by [`Run::execute`] or [`Run::stream`], so it can never be
//! re-entered. The loop:
//!
//! 1. append the next-step prompt (if any)
//! 2. think, retrying retryable model errors up to `think_retries` times
//! 3. finish when no action is needed, otherwise act and append observations
//! 4. stop on termination, on a fatal condition, or when the budget runs out
//!
//! Model and tool failures are contained; only cancellation, timeouts and
//! faults inside the engine itself interrupt a step.

use futures::FutureExt;
use serde::Serialize;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use strand_core::{
    ConfigError, DeltaSink, EngineError, FailureKind, Message, ModelCollaborator, ModelError,
    Role, RunConfig, RunFailure, RunState, ThinkDecision,
};
use strand_tools::ToolRegistry;
use tracing::{Instrument, debug, debug_span, error, info, info_span, warn};
use uuid::Uuid;

use crate::cancel::CancelHandle;
use crate::streaming::{self, RunStream};
use crate::think_act::{ThinkAct, ThinkContext, ToolCallingAgent};

/// Step result recorded when the model decides no action is needed.
pub const NO_ACTION_NEEDED: &str = "no further action needed";

/// Outcome of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct FinalResult {
    pub run_id: Uuid,
    pub name: String,
    /// Always terminal.
    pub state: RunState,
    /// Completed steps.
    pub steps: u32,
    pub step_budget: u32,
    /// Transcript: `Step k: ...` lines plus a closing `Terminated: ...` line
    /// when the run did not finish on its own.
    pub text: String,
    /// Set exactly when `state` is `Error`.
    pub failure: Option<RunFailure>,
    pub history: Vec<Message>,
}

impl FinalResult {
    /// `true` when the run reached `Finished`.
    pub fn is_success(&self) -> bool {
        self.state == RunState::Finished
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Most recent non-empty assistant text, typically the model's answer.
    pub fn answer(&self) -> Option<&str> {
        self.history
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant && !m.content.is_empty())
            .map(|m| m.content.as_str())
    }

    /// Observations appended to history, in order.
    pub fn observations(&self) -> impl Iterator<Item = &Message> {
        self.history.iter().filter(|m| m.is_observation())
    }
}

/// How a single step ended.
enum StepOutcome {
    Continue(String),
    Finished(String),
    /// The step completed but the run cannot go on.
    Failed { summary: String, failure: RunFailure },
    /// The step was cut short.
    Interrupted(RunFailure),
}

/// One execution of the engine toward a single goal.
pub struct Run {
    id: Uuid,
    config: RunConfig,
    agent: Arc<dyn ThinkAct>,
    state: RunState,
    steps: u32,
    history: Vec<Message>,
    transcript: Vec<String>,
    failure: Option<RunFailure>,
    cancel: CancelHandle,
}

impl Run {
    pub fn builder() -> RunBuilder {
        RunBuilder::default()
    }

    pub(crate) fn new(config: RunConfig, agent: Arc<dyn ThinkAct>) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            agent,
            state: RunState::Idle,
            steps: 0,
            history: Vec::new(),
            transcript: Vec::new(),
            failure: None,
            cancel: CancelHandle::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Handle that cancels this run from elsewhere.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Drive the run to a terminal state and return its result.
    ///
    /// Fails only when the goal is empty; every other outcome, including
    /// model failure and cancellation, is reported through [`FinalResult`].
    pub async fn execute(self, goal: impl Into<String>) -> Result<FinalResult, EngineError> {
        let goal = checked_goal(goal)?;
        Ok(self.drive(goal, DeltaSink::disabled()).await)
    }

    /// Drive the run on a separate task and receive its progress as events.
    ///
    /// The task is spawned on the current Tokio runtime; without one this
    /// returns [`EngineError::Internal`].
    pub fn stream(self, goal: impl Into<String>) -> Result<RunStream, EngineError> {
        let goal = checked_goal(goal)?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|err| {
            EngineError::Internal(format!("streaming needs a Tokio runtime: {err}"))
        })?;
        Ok(streaming::spawn(&runtime, self, goal))
    }

    pub(crate) async fn drive(mut self, goal: String, sink: DeltaSink) -> FinalResult {
        let span = info_span!("run", run.name = %self.config.name, run.id = %self.id);
        async move {
            info!(step_budget = self.config.step_budget, "run started");
            if let Err(err) = self.transition(RunState::Running) {
                self.fail(RunFailure::new(FailureKind::Internal, err.to_string()));
                return self.into_result();
            }
            self.history.push(Message::user(goal));

            while self.steps < self.config.step_budget && self.state == RunState::Running {
                if self.cancel.is_cancelled() {
                    self.interrupt(self.cancel.failure());
                    break;
                }
                let step = self.steps + 1;
                let outcome = self
                    .step(&sink)
                    .instrument(debug_span!("step", step))
                    .await;
                match outcome {
                    StepOutcome::Continue(summary) => {
                        self.complete_step(step, summary);
                    }
                    StepOutcome::Finished(summary) => {
                        self.complete_step(step, summary);
                        self.settle(RunState::Finished);
                    }
                    StepOutcome::Failed { summary, failure } => {
                        self.complete_step(step, summary);
                        self.fail(failure);
                    }
                    StepOutcome::Interrupted(failure) => self.interrupt(failure),
                }
            }

            if self.state == RunState::Running {
                self.settle(RunState::BudgetExceeded);
                self.transcript.push(format!(
                    "Terminated: reached step budget ({})",
                    self.config.step_budget
                ));
            }

            info!(state = %self.state, steps = self.steps, "run ended");
            self.into_result()
        }
        .instrument(span)
        .await
    }

    async fn step(&mut self, sink: &DeltaSink) -> StepOutcome {
        if !self.config.next_step_prompt.is_empty() {
            self.history
                .push(Message::user(self.config.next_step_prompt.clone()));
        }

        let decision = match self.think(sink).await {
            Ok(Ok(decision)) => decision,
            Ok(Err(err)) => {
                let summary = format!("Model invocation failed: {err}");
                self.history.push(Message::assistant(summary.clone()));
                return StepOutcome::Failed {
                    failure: RunFailure::new(FailureKind::ModelInvocation, summary.clone()),
                    summary,
                };
            }
            Err(interrupted) => return StepOutcome::Interrupted(interrupted),
        };

        let (content, calls) = match decision {
            ThinkDecision::Finish { content } => {
                debug!("model needs no further action");
                if !content.is_empty() {
                    self.history.push(Message::assistant(content));
                }
                return StepOutcome::Finished(NO_ACTION_NEEDED.to_string());
            }
            ThinkDecision::Act { content, calls } => (content, calls),
        };

        debug!(calls = calls.len(), "model requested tools");
        self.history
            .push(Message::assistant_with_calls(content, calls.iter().cloned()));

        let agent = self.agent.clone();
        let report = match self.guarded(agent.act(&calls)).await {
            Ok(report) => report,
            Err(interrupted) => return StepOutcome::Interrupted(interrupted),
        };

        let summary = report
            .observations
            .iter()
            .map(|o| {
                let tool = o
                    .message
                    .tool_result
                    .as_ref()
                    .map_or("?", |r| r.tool_name.as_str());
                format!("{tool}: {}", o.content())
            })
            .collect::<Vec<_>>()
            .join("\n");
        self.history
            .extend(report.observations.into_iter().map(|o| o.message));

        if report.terminated {
            StepOutcome::Finished(summary)
        } else {
            StepOutcome::Continue(summary)
        }
    }

    /// Think, retrying retryable model errors within the configured bound.
    async fn think(&self, sink: &DeltaSink) -> Result<Result<ThinkDecision, ModelError>, RunFailure> {
        let agent = self.agent.clone();
        let mut attempt = 0;
        loop {
            let ctx = ThinkContext {
                system_prompt: &self.config.system_prompt,
                history: &self.history,
            };
            match self.guarded(agent.think(ctx, sink)).await? {
                Err(err) if err.is_retryable() && attempt < self.config.think_retries => {
                    attempt += 1;
                    warn!(error = %err, attempt, max = self.config.think_retries, "retrying think");
                }
                result => return Ok(result),
            }
        }
    }

    /// Await `fut` unless the run is cancelled first; panics become faults.
    async fn guarded<F: Future>(&self, fut: F) -> Result<F::Output, RunFailure> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(self.cancel.failure()),
            outcome = AssertUnwindSafe(fut).catch_unwind() => outcome.map_err(|panic| {
                let detail = panic_message(panic.as_ref());
                error!(panic = %detail, "fault inside think/act");
                RunFailure::new(FailureKind::Internal, format!("internal fault: {detail}"))
            }),
        }
    }

    fn complete_step(&mut self, step: u32, summary: String) {
        self.steps = step;
        self.transcript.push(format!("Step {step}: {summary}"));
    }

    fn transition(&mut self, to: RunState) -> Result<(), strand_core::StateError> {
        self.state = self.state.transition(to)?;
        Ok(())
    }

    /// Move to a terminal state; an illegal move is itself a fault.
    fn settle(&mut self, to: RunState) {
        if let Err(err) = self.transition(to) {
            error!(error = %err, "illegal state transition");
            self.state = RunState::Error;
            self.failure = Some(RunFailure::new(FailureKind::Internal, err.to_string()));
        }
    }

    fn fail(&mut self, failure: RunFailure) {
        warn!(kind = %failure.kind, message = %failure.message, "run failed");
        self.state = RunState::Error;
        self.failure = Some(failure);
    }

    fn interrupt(&mut self, failure: RunFailure) {
        self.transcript.push(format!("Terminated: {}", failure.message));
        self.fail(failure);
    }

    fn into_result(self) -> FinalResult {
        FinalResult {
            run_id: self.id,
            name: self.config.name,
            state: self.state,
            steps: self.steps,
            step_budget: self.config.step_budget,
            text: self.transcript.join("\n"),
            failure: self.failure,
            history: self.history,
        }
    }
}

fn checked_goal(goal: impl Into<String>) -> Result<String, EngineError> {
    let goal = goal.into();
    if goal.trim().is_empty() {
        return Err(EngineError::EmptyGoal);
    }
    Ok(goal)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}

/// Builder for a standalone [`Run`].
///
/// Supply either a ready [`ThinkAct`] or a model (plus optional tools), in
/// which case a [`ToolCallingAgent`] is assembled.
#[derive(Default)]
pub struct RunBuilder {
    config: RunConfig,
    agent: Option<Arc<dyn ThinkAct>>,
    model: Option<Arc<dyn ModelCollaborator>>,
    tools: Option<Arc<ToolRegistry>>,
}

impl RunBuilder {
    pub fn config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    pub fn agent(mut self, agent: Arc<dyn ThinkAct>) -> Self {
        self.agent = Some(agent);
        self
    }

    pub fn model(mut self, model: Arc<dyn ModelCollaborator>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn tools(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn build(self) -> Result<Run, EngineError> {
        self.config.validate()?;
        let agent: Arc<dyn ThinkAct> = match (self.agent, self.model) {
            (Some(agent), _) => agent,
            (None, Some(model)) => Arc::new(ToolCallingAgent::new(
                model,
                self.tools.unwrap_or_default(),
            )),
            (None, None) => {
                return Err(ConfigError::Validation(
                    "a run needs a model collaborator or a think/act capability".into(),
                )
                .into());
            }
        };
        Ok(Run::new(self.config, agent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;
    use strand_core::{DispatchStatus, NonEmptyVec, ToolCall};
    use strand_tools::Observation;

    use crate::think_act::ActReport;

    enum Plan {
        Finish,
        Act(&'static str),
        Fail(ModelError),
        Panic,
        Hang,
    }

    /// Scripted think/act; repeats the last plan once the script runs out.
    struct Script {
        plans: Mutex<VecDeque<Plan>>,
        history_lens: Mutex<Vec<usize>>,
    }

    impl Script {
        fn new(plans: Vec<Plan>) -> Arc<Self> {
            Arc::new(Self {
                plans: Mutex::new(plans.into()),
                history_lens: Mutex::new(Vec::new()),
            })
        }

        fn next(&self) -> Plan {
            let mut plans = self.plans.lock().unwrap();
            let plan = plans.pop_front().unwrap_or(Plan::Act("noop"));
            if plans.is_empty() {
                match &plan {
                    Plan::Finish => plans.push_back(Plan::Finish),
                    Plan::Act(name) => plans.push_back(Plan::Act(name)),
                    _ => {}
                }
            }
            plan
        }
    }

    #[async_trait]
    impl ThinkAct for Script {
        async fn think(
            &self,
            ctx: ThinkContext<'_>,
            _sink: &DeltaSink,
        ) -> Result<ThinkDecision, ModelError> {
            self.history_lens.lock().unwrap().push(ctx.history.len());
            match self.next() {
                Plan::Finish => Ok(ThinkDecision::finish("all done")),
                Plan::Act(name) => Ok(ThinkDecision::call("working", ToolCall::named(name))),
                Plan::Fail(err) => Err(err),
                Plan::Panic => panic!("think exploded"),
                Plan::Hang => {
                    std::future::pending::<()>().await;
                    unreachable!()
                }
            }
        }

        async fn act(&self, calls: &NonEmptyVec<ToolCall>) -> ActReport {
            let terminated = calls.iter().any(|c| c.name == "terminate");
            ActReport {
                observations: calls
                    .iter()
                    .map(|c| Observation::new(c, DispatchStatus::Succeeded, "ok"))
                    .collect(),
                terminated,
            }
        }
    }

    fn run(script: Arc<Script>, budget: u32) -> Run {
        let config = RunConfig::builder().step_budget(budget).build().unwrap();
        Run::builder().config(config).agent(script).build().unwrap()
    }

    #[tokio::test]
    async fn budget_exhaustion() {
        let result = run(Script::new(vec![Plan::Act("noop")]), 3)
            .execute("loop forever")
            .await
            .unwrap();

        assert_eq!(result.state, RunState::BudgetExceeded);
        assert_eq!(result.steps, 3);
        assert!(result.failure.is_none());
        assert!(
            result
                .text()
                .ends_with("Step 3: noop: ok\nTerminated: reached step budget (3)")
        );
    }

    #[tokio::test]
    async fn finish_on_first_think() {
        let result = run(Script::new(vec![Plan::Finish]), 5)
            .execute("say hi")
            .await
            .unwrap();

        assert!(result.is_success());
        assert_eq!(result.steps, 1);
        assert_eq!(result.text(), "Step 1: no further action needed");
        assert_eq!(result.answer(), Some("all done"));
    }

    #[tokio::test]
    async fn terminate_stops_at_that_step() {
        let script = Script::new(vec![Plan::Act("noop"), Plan::Act("terminate")]);
        let result = run(script, 10).execute("stop soon").await.unwrap();

        assert_eq!(result.state, RunState::Finished);
        assert_eq!(result.steps, 2);
    }

    #[tokio::test]
    async fn history_grows_and_next_step_prompt_repeats() {
        let script = Script::new(vec![Plan::Act("noop"), Plan::Finish]);
        let config = RunConfig::builder()
            .step_budget(5)
            .next_step_prompt("What next?")
            .build()
            .unwrap();
        let result = Run::builder()
            .config(config)
            .agent(script.clone())
            .build()
            .unwrap()
            .execute("goal")
            .await
            .unwrap();

        // goal, prompt | assistant, observation, prompt
        assert_eq!(*script.history_lens.lock().unwrap(), [2, 5]);
        let prompts = result
            .history
            .iter()
            .filter(|m| m.role == Role::User && m.content == "What next?")
            .count();
        assert_eq!(prompts, 2);
        assert_eq!(result.history[0].content, "goal");
    }

    #[tokio::test]
    async fn model_failure_is_terminal_error() {
        let script = Script::new(vec![Plan::Fail(ModelError::Provider("quota".into()))]);
        let result = run(script, 5).execute("goal").await.unwrap();

        assert_eq!(result.state, RunState::Error);
        assert_eq!(result.steps, 1);
        let failure = result.failure.as_ref().unwrap();
        assert_eq!(failure.kind, FailureKind::ModelInvocation);
        assert_eq!(
            result.text(),
            "Step 1: Model invocation failed: provider error: quota"
        );
        assert_eq!(
            result.history.last().unwrap().content,
            "Model invocation failed: provider error: quota"
        );
    }

    #[tokio::test]
    async fn retryable_model_errors_are_retried() {
        let script = Script::new(vec![
            Plan::Fail(ModelError::Network("reset".into())),
            Plan::Fail(ModelError::Network("reset".into())),
            Plan::Finish,
        ]);
        let config = RunConfig::builder().think_retries(2).build().unwrap();
        let result = Run::builder()
            .config(config)
            .agent(script)
            .build()
            .unwrap()
            .execute("goal")
            .await
            .unwrap();

        assert!(result.is_success());
        assert_eq!(result.steps, 1);
    }

    #[tokio::test]
    async fn panic_in_think_is_internal_fault() {
        let result = run(Script::new(vec![Plan::Panic]), 5)
            .execute("goal")
            .await
            .unwrap();

        assert_eq!(result.state, RunState::Error);
        assert_eq!(result.steps, 0);
        let failure = result.failure.unwrap();
        assert_eq!(failure.kind, FailureKind::Internal);
        assert!(failure.message.contains("think exploded"));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_a_hung_think() {
        let run = run(Script::new(vec![Plan::Hang]), 5);
        let handle = run.cancel_handle();
        let task = tokio::spawn(run.execute("goal"));

        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.cancel();
        let result = task.await.unwrap().unwrap();

        assert_eq!(result.state, RunState::Error);
        assert_eq!(result.failure.as_ref().unwrap().kind, FailureKind::Cancelled);
        assert_eq!(result.text(), "Terminated: run cancelled");
    }

    #[tokio::test]
    async fn empty_goal_is_rejected() {
        let err = run(Script::new(vec![Plan::Finish]), 1)
            .execute("   ")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::EmptyGoal));
    }

    #[test]
    fn builder_needs_model_or_agent() {
        assert!(matches!(
            Run::builder().build(),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn streaming_outside_a_runtime_is_an_error() {
        let err = run(Script::new(vec![Plan::Finish]), 1)
            .stream("goal")
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Internal(msg) if msg.starts_with("streaming needs a Tokio runtime")
        ));
    }

    #[test]
    fn fresh_run_is_idle() {
        let run = run(Script::new(vec![Plan::Finish]), 1);
        assert_eq!(run.state(), RunState::Idle);
        assert_eq!(run.steps(), 0);
        assert!(run.history().is_empty());
    }
}
