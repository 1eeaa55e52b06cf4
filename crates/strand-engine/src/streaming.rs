//! # Streaming Adapter
//!
//! Runs a [`Run`] on its own task and exposes progress as [`RunEvent`]s:
//! zero or more `Partial` deltas, then exactly one `Completed` or `Error`,
//! then the channel closes.
//!
//! The whole run is bounded by the configured wall-clock timeout. A
//! subscriber that disconnects or cancels aborts the in-flight step and
//! receives nothing further.

use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use strand_core::{DeltaSink, EngineError, FailureKind, RunEvent, RunFailure, RunState};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cancel::CancelHandle;
use crate::run::{FinalResult, Run};

/// Buffered events between the run task and the subscriber.
const EVENT_BUFFER: usize = 64;

pub(crate) fn spawn(runtime: &Handle, run: Run, goal: String) -> RunStream {
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    let cancel = run.cancel_handle();
    let task = runtime.spawn(supervise(run, goal, tx));
    RunStream {
        rx,
        cancel,
        task: Some(task),
    }
}

async fn supervise(run: Run, goal: String, tx: mpsc::Sender<RunEvent>) -> FinalResult {
    let cancel = run.cancel_handle();
    let timeout = run.config().stream_timeout;
    let mut drive = Box::pin(run.drive(goal, DeltaSink::new(tx.clone())));
    let deadline = tokio::time::sleep(timeout);
    tokio::pin!(deadline);

    let finished = tokio::select! {
        biased;
        result = &mut drive => Some(result),
        _ = tx.closed() => {
            debug!("subscriber disconnected; cancelling run");
            cancel.cancel();
            None
        }
        _ = &mut deadline => {
            warn!(timeout = %humantime::format_duration(timeout), "run timed out");
            cancel.cancel_with(RunFailure::new(
                FailureKind::TimedOut,
                format!("run timed out after {}", humantime::format_duration(timeout)),
            ));
            None
        }
    };
    let result = match finished {
        Some(result) => result,
        None => drive.await,
    };

    match (&result.state, &result.failure) {
        (RunState::Error, Some(failure)) if failure.kind == FailureKind::Cancelled => {
            debug!("run cancelled; no terminal event owed");
        }
        (RunState::Error, failure) => {
            let message = failure
                .as_ref()
                .map_or_else(|| "run failed".to_string(), |f| f.message.clone());
            let _ = tx.send(RunEvent::Error(message)).await;
        }
        _ => {
            let _ = tx.send(RunEvent::Completed(result.text.clone())).await;
        }
    }
    result
}

/// Subscriber side of a streamed run.
///
/// Also a [`Stream`] of [`RunEvent`]s. Dropping it cancels the run.
#[derive(Debug)]
pub struct RunStream {
    rx: mpsc::Receiver<RunEvent>,
    cancel: CancelHandle,
    task: Option<JoinHandle<FinalResult>>,
}

impl RunStream {
    /// Next event, or `None` once the channel is closed.
    pub async fn recv(&mut self) -> Option<RunEvent> {
        self.rx.recv().await
    }

    /// Cancel the run. No further events are delivered.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        self.rx.close();
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Wait for the run to end, discarding unread events, and return its
    /// result.
    pub async fn finish(mut self) -> Result<FinalResult, EngineError> {
        while self.rx.recv().await.is_some() {}
        let task = self
            .task
            .take()
            .ok_or_else(|| EngineError::Internal("run task already joined".into()))?;
        task.await
            .map_err(|e| EngineError::Internal(format!("run task failed: {e}")))
    }
}

impl Stream for RunStream {
    type Item = RunEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<RunEvent>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

impl Drop for RunStream {
    fn drop(&mut self) {
        if self.task.as_ref().is_some_and(|task| !task.is_finished()) {
            self.cancel.cancel();
        }
    }
}
