//! # Scripted Model
//!
//! A [`ModelCollaborator`] that replays a fixed sequence of turns, so a run's
//! path through the think/act loop is fully determined by the test.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use strand_core::{
    DeltaSink, ModelCollaborator, ModelError, NonEmptyVec, ThinkDecision, ThinkRequest, ToolCall,
};

use crate::locked;

#[derive(Debug, Clone)]
enum Turn {
    Decide(ThinkDecision),
    Fail(ModelError),
    Panic(String),
    Hang,
}

/// What the model was shown on one think call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub history_len: usize,
    pub latest_user_text: Option<String>,
    pub tool_names: Vec<String>,
    pub streaming: bool,
}

/// Model that answers from a script.
///
/// Once the script runs out, the fallback turn is repeated; by default that
/// is a finish with the text `"script exhausted"`. Clones share the script
/// and the request log.
#[derive(Debug, Clone)]
pub struct ScriptedModel {
    turns: Arc<Mutex<VecDeque<Turn>>>,
    fallback: Turn,
    delay: Option<Duration>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl Default for ScriptedModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self {
            turns: Arc::default(),
            fallback: Turn::Decide(ThinkDecision::finish("script exhausted")),
            delay: None,
            requests: Arc::default(),
        }
    }

    fn then(self, turn: Turn) -> Self {
        locked(&self.turns).push_back(turn);
        self
    }

    /// Decide that no action is needed.
    pub fn then_finish(self, content: impl Into<String>) -> Self {
        self.then(Turn::Decide(ThinkDecision::finish(content)))
    }

    /// Request a single tool call.
    pub fn then_call(self, tool: impl Into<String>, params: Value) -> Self {
        let call = ToolCall::new(tool, params);
        self.then(Turn::Decide(ThinkDecision::call("", call)))
    }

    /// Request several tool calls in one step.
    pub fn then_calls(self, content: impl Into<String>, calls: NonEmptyVec<ToolCall>) -> Self {
        self.then(Turn::Decide(ThinkDecision::act(content, calls)))
    }

    /// Fail the think call.
    pub fn then_fail(self, error: ModelError) -> Self {
        self.then(Turn::Fail(error))
    }

    /// Panic inside the think call.
    pub fn then_panic(self, message: impl Into<String>) -> Self {
        self.then(Turn::Panic(message.into()))
    }

    /// Never answer.
    pub fn then_hang(self) -> Self {
        self.then(Turn::Hang)
    }

    /// Keep requesting `tool` once the script is exhausted.
    pub fn otherwise_call(mut self, tool: impl Into<String>) -> Self {
        self.fallback = Turn::Decide(ThinkDecision::call("", ToolCall::named(tool)));
        self
    }

    /// Keep failing once the script is exhausted.
    pub fn otherwise_fail(mut self, error: ModelError) -> Self {
        self.fallback = Turn::Fail(error);
        self
    }

    /// Sleep before every answer.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every request seen so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        locked(&self.requests).clone()
    }

    pub fn call_count(&self) -> usize {
        locked(&self.requests).len()
    }

    /// Turns not yet consumed.
    pub fn remaining(&self) -> usize {
        locked(&self.turns).len()
    }

    async fn answer(
        &self,
        request: ThinkRequest<'_>,
        streaming: bool,
    ) -> Result<ThinkDecision, ModelError> {
        locked(&self.requests).push(RecordedRequest {
            history_len: request.history.len(),
            latest_user_text: request.latest_user_text().map(str::to_string),
            tool_names: request.tools.iter().map(|t| t.name.clone()).collect(),
            streaming,
        });
        let turn = locked(&self.turns)
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match turn {
            Turn::Decide(decision) => Ok(decision),
            Turn::Fail(error) => Err(error),
            Turn::Panic(message) => panic!("{message}"),
            Turn::Hang => std::future::pending().await,
        }
    }
}

#[async_trait]
impl ModelCollaborator for ScriptedModel {
    async fn think(&self, request: ThinkRequest<'_>) -> Result<ThinkDecision, ModelError> {
        self.answer(request, false).await
    }

    /// Emits the decision text word by word.
    async fn think_streaming(
        &self,
        request: ThinkRequest<'_>,
        sink: &DeltaSink,
    ) -> Result<ThinkDecision, ModelError> {
        let decision = self.answer(request, true).await?;
        for chunk in decision.content().split_inclusive(' ') {
            sink.emit(chunk).await;
        }
        Ok(decision)
    }
}
