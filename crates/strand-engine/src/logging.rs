//! Request/response logging around a model collaborator.

use async_trait::async_trait;
use strand_core::{DeltaSink, ModelCollaborator, ModelError, ThinkDecision, ThinkRequest};
use tracing::{info, warn};

/// Logs every think request and its response at `info` level.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use strand_engine::{LoggingModel, ModelCollaborator};
///
/// fn wrap<M: ModelCollaborator + 'static>(model: M) -> Arc<dyn ModelCollaborator> {
///     Arc::new(LoggingModel::new(model))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct LoggingModel<M> {
    inner: M,
}

impl<M> LoggingModel<M> {
    pub fn new(inner: M) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> M {
        self.inner
    }
}

fn log_request(request: &ThinkRequest<'_>, streaming: bool) {
    info!(
        streaming,
        history.len = request.history.len(),
        tools = request.tools.len(),
        user = request.latest_user_text().unwrap_or_default(),
        "model request"
    );
}

fn log_response(result: &Result<ThinkDecision, ModelError>) {
    match result {
        Ok(decision) => info!(
            should_act = decision.should_act(),
            calls = decision.calls().map_or(0, |c| c.len()),
            text = decision.content(),
            "model response"
        ),
        Err(err) => warn!(error = %err, code = err.error_code(), "model request failed"),
    }
}

#[async_trait]
impl<M: ModelCollaborator> ModelCollaborator for LoggingModel<M> {
    async fn think(&self, request: ThinkRequest<'_>) -> Result<ThinkDecision, ModelError> {
        log_request(&request, false);
        let result = self.inner.think(request).await;
        log_response(&result);
        result
    }

    async fn think_streaming(
        &self,
        request: ThinkRequest<'_>,
        sink: &DeltaSink,
    ) -> Result<ThinkDecision, ModelError> {
        log_request(&request, true);
        let result = self.inner.think_streaming(request, sink).await;
        log_response(&result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strand_core::{Message, RunEvent};
    use tokio::sync::mpsc;

    struct Parrot;

    #[async_trait]
    impl ModelCollaborator for Parrot {
        async fn think(&self, request: ThinkRequest<'_>) -> Result<ThinkDecision, ModelError> {
            match request.latest_user_text() {
                Some(text) => Ok(ThinkDecision::finish(text)),
                None => Err(ModelError::InvalidResponse("nothing to repeat".into())),
            }
        }
    }

    #[tokio::test]
    async fn passes_results_through() {
        let model = LoggingModel::new(Parrot);
        let history = vec![Message::user("polly")];
        let request = ThinkRequest {
            system_prompt: "",
            history: &history,
            tools: &[],
        };
        assert_eq!(
            model.think(request).await.unwrap(),
            ThinkDecision::finish("polly")
        );

        let empty = ThinkRequest {
            system_prompt: "",
            history: &[],
            tools: &[],
        };
        assert!(model.think(empty).await.is_err());
    }

    #[tokio::test]
    async fn streaming_delegates_to_inner() {
        let model = LoggingModel::new(Parrot);
        let history = vec![Message::user("hello")];
        let request = ThinkRequest {
            system_prompt: "",
            history: &history,
            tools: &[],
        };
        let (tx, mut rx) = mpsc::channel(2);
        model
            .think_streaming(request, &DeltaSink::new(tx))
            .await
            .unwrap();
        assert_eq!(rx.recv().await, Some(RunEvent::Partial("hello".into())));
    }
}
