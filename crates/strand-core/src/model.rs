//! Model collaborator contract.

use crate::collections::NonEmptyVec;
use crate::error::ModelError;
use crate::event::DeltaSink;
use crate::message::{Message, Role, ToolCall};
use crate::tool::ToolDescriptor;
use async_trait::async_trait;

/// Everything the model sees for one think call.
#[derive(Debug, Clone, Copy)]
pub struct ThinkRequest<'a> {
    pub system_prompt: &'a str,
    /// Full history of the run, oldest first.
    pub history: &'a [Message],
    /// Tools the model may request, including the termination capability.
    pub tools: &'a [ToolDescriptor],
}

impl<'a> ThinkRequest<'a> {
    /// Content of the most recent user message, if any.
    pub fn latest_user_text(&self) -> Option<&'a str> {
        self.history
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

/// What the model decided.
#[derive(Debug, Clone, PartialEq)]
pub enum ThinkDecision {
    /// No action needed.
    Finish { content: String },
    /// Invoke the listed tools, in order.
    Act {
        content: String,
        calls: NonEmptyVec<ToolCall>,
    },
}

impl ThinkDecision {
    pub fn finish(content: impl Into<String>) -> Self {
        ThinkDecision::Finish {
            content: content.into(),
        }
    }

    pub fn act(content: impl Into<String>, calls: NonEmptyVec<ToolCall>) -> Self {
        ThinkDecision::Act {
            content: content.into(),
            calls,
        }
    }

    /// Act on a single call.
    pub fn call(content: impl Into<String>, call: ToolCall) -> Self {
        Self::act(content, NonEmptyVec::singleton(call))
    }

    pub fn should_act(&self) -> bool {
        matches!(self, ThinkDecision::Act { .. })
    }

    pub fn content(&self) -> &str {
        match self {
            ThinkDecision::Finish { content } | ThinkDecision::Act { content, .. } => content,
        }
    }

    pub fn calls(&self) -> Option<&NonEmptyVec<ToolCall>> {
        match self {
            ThinkDecision::Finish { .. } => None,
            ThinkDecision::Act { calls, .. } => Some(calls),
        }
    }
}

/// The language model behind the think phase.
///
/// Shared read-only across concurrent runs.
#[async_trait]
pub trait ModelCollaborator: Send + Sync {
    async fn think(&self, request: ThinkRequest<'_>) -> Result<ThinkDecision, ModelError>;

    /// Streaming form: push text deltas into `sink`, then return the decision.
    ///
    /// The default delegates to [`think`](Self::think) and emits the decision
    /// text as a single delta.
    async fn think_streaming(
        &self,
        request: ThinkRequest<'_>,
        sink: &DeltaSink,
    ) -> Result<ThinkDecision, ModelError> {
        let decision = self.think(request).await?;
        sink.emit(decision.content()).await;
        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::RunEvent;
    use tokio::sync::mpsc;

    struct Fixed;

    #[async_trait]
    impl ModelCollaborator for Fixed {
        async fn think(&self, request: ThinkRequest<'_>) -> Result<ThinkDecision, ModelError> {
            let text = request.latest_user_text().unwrap_or_default();
            Ok(ThinkDecision::finish(format!("seen: {text}")))
        }
    }

    #[tokio::test]
    async fn default_streaming_emits_decision_text() {
        let history = vec![Message::user("goal"), Message::assistant("ok")];
        let request = ThinkRequest {
            system_prompt: "",
            history: &history,
            tools: &[],
        };
        let (tx, mut rx) = mpsc::channel(4);

        let decision = Fixed
            .think_streaming(request, &DeltaSink::new(tx))
            .await
            .unwrap();

        assert!(!decision.should_act());
        assert_eq!(
            rx.recv().await,
            Some(RunEvent::Partial("seen: goal".into()))
        );
    }

    #[test]
    fn act_decision_exposes_calls() {
        let decision = ThinkDecision::call("look it up", ToolCall::named("search"));
        assert!(decision.should_act());
        assert_eq!(decision.calls().map(|c| c.len()), Some(1));
        assert_eq!(decision.content(), "look it up");
    }
}
