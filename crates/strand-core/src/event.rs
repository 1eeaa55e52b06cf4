//! Streaming progress events.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Progress of a streamed run.
///
/// Any number of `Partial` events is followed by exactly one `Completed` or
/// `Error`, after which the channel closes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum RunEvent {
    /// A text delta produced while the model was thinking.
    Partial(String),
    /// Final run text.
    Completed(String),
    /// Description of a fatal condition.
    Error(String),
}

impl RunEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunEvent::Partial(_))
    }

    pub fn text(&self) -> &str {
        match self {
            RunEvent::Partial(s) | RunEvent::Completed(s) | RunEvent::Error(s) => s,
        }
    }
}

/// Where a streaming model pushes its text deltas.
///
/// A disabled sink drops everything, which lets blocking runs share the same
/// think path as streamed ones.
#[derive(Debug, Clone, Default)]
pub struct DeltaSink {
    tx: Option<mpsc::Sender<RunEvent>>,
}

impl DeltaSink {
    pub fn new(tx: mpsc::Sender<RunEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.tx.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    /// Forward one delta as [`RunEvent::Partial`]. Empty deltas are dropped.
    pub async fn emit(&self, delta: impl Into<String>) {
        let delta = delta.into();
        if delta.is_empty() {
            return;
        }
        if let Some(tx) = &self.tx {
            // A gone subscriber is handled by the streaming adapter.
            let _ = tx.send(RunEvent::Partial(delta)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_wire_format() {
        let json = serde_json::to_string(&RunEvent::Completed("done".into())).unwrap();
        assert_eq!(json, r#"{"type":"completed","data":"done"}"#);
        assert!(RunEvent::Error("x".into()).is_terminal());
        assert!(!RunEvent::Partial("x".into()).is_terminal());
    }

    #[tokio::test]
    async fn sink_forwards_partials() {
        let (tx, mut rx) = mpsc::channel(4);
        let sink = DeltaSink::new(tx);
        sink.emit("hel").await;
        sink.emit("").await;
        sink.emit("lo").await;
        drop(sink);

        assert_eq!(rx.recv().await, Some(RunEvent::Partial("hel".into())));
        assert_eq!(rx.recv().await, Some(RunEvent::Partial("lo".into())));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn disabled_sink_is_silent() {
        let sink = DeltaSink::disabled();
        assert!(!sink.is_enabled());
        sink.emit("ignored").await;
    }
}
