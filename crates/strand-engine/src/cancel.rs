//! Cancellation handles for runs.

use std::sync::{Arc, OnceLock};
use strand_core::RunFailure;
use tokio_util::sync::CancellationToken;

/// Requests cancellation of a run and records why.
///
/// Clones share the same token. The first recorded reason wins; later
/// requests only re-trigger an already cancelled token.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle {
    token: CancellationToken,
    reason: Arc<OnceLock<RunFailure>>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel on behalf of the caller.
    pub fn cancel(&self) {
        self.cancel_with(RunFailure::cancelled());
    }

    /// Cancel with a specific terminal description (e.g. a timeout).
    pub fn cancel_with(&self, failure: RunFailure) {
        let _ = self.reason.set(failure);
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// A future that resolves when cancellation is requested.
    pub fn cancelled(&self) -> tokio_util::sync::WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// Terminal description for a cancelled run.
    pub fn failure(&self) -> RunFailure {
        self.reason.get().cloned().unwrap_or_else(RunFailure::cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strand_core::FailureKind;

    #[test]
    fn first_reason_wins() {
        let handle = CancelHandle::new();
        let clone = handle.clone();
        assert!(!handle.is_cancelled());

        clone.cancel_with(RunFailure::new(FailureKind::TimedOut, "too slow"));
        handle.cancel();

        assert!(handle.is_cancelled());
        assert_eq!(handle.failure().kind, FailureKind::TimedOut);
    }

    #[tokio::test]
    async fn cancelled_future_resolves() {
        let handle = CancelHandle::new();
        let waiter = handle.clone();
        let task = tokio::spawn(async move { waiter.cancelled().await });
        handle.cancel();
        task.await.unwrap();
        assert_eq!(handle.failure(), RunFailure::cancelled());
    }
}
