//! Fluent assertions on run outcomes and event streams.

use futures::StreamExt;
use strand_core::{DispatchStatus, FailureKind, RunEvent, RunState};
use strand_engine::{FinalResult, RunStream};

/// Assertions on a [`FinalResult`]; each panics with the run text on failure.
pub trait RunAssertions {
    fn assert_state(&self, expected: RunState) -> &Self;
    fn assert_finished(&self) -> &Self;
    fn assert_budget_exceeded(&self) -> &Self;
    fn assert_failed_with(&self, kind: FailureKind) -> &Self;
    fn assert_steps(&self, expected: u32) -> &Self;
    fn assert_text_contains(&self, needle: &str) -> &Self;
    /// Statuses of all observations, in order.
    fn assert_observations(&self, expected: &[DispatchStatus]) -> &Self;
}

impl RunAssertions for FinalResult {
    fn assert_state(&self, expected: RunState) -> &Self {
        assert_eq!(
            self.state, expected,
            "unexpected final state; failure: {:?}\n{}",
            self.failure, self.text
        );
        self
    }

    fn assert_finished(&self) -> &Self {
        self.assert_state(RunState::Finished)
    }

    fn assert_budget_exceeded(&self) -> &Self {
        self.assert_state(RunState::BudgetExceeded)
    }

    fn assert_failed_with(&self, kind: FailureKind) -> &Self {
        self.assert_state(RunState::Error);
        let actual = self.failure.as_ref().map(|f| f.kind);
        assert_eq!(actual, Some(kind), "unexpected failure kind\n{}", self.text);
        self
    }

    fn assert_steps(&self, expected: u32) -> &Self {
        assert_eq!(self.steps, expected, "unexpected step count\n{}", self.text);
        self
    }

    fn assert_text_contains(&self, needle: &str) -> &Self {
        assert!(
            self.text.contains(needle),
            "run text does not contain {needle:?}\n{}",
            self.text
        );
        self
    }

    fn assert_observations(&self, expected: &[DispatchStatus]) -> &Self {
        let actual: Vec<_> = self.observations().filter_map(|m| m.status()).collect();
        assert_eq!(actual, expected, "unexpected observations\n{}", self.text);
        self
    }
}

/// Drain a stream into its events.
pub async fn collect_events(stream: RunStream) -> Vec<RunEvent> {
    stream.collect().await
}

/// Assertions on the events of a streamed run.
pub trait EventAssertions {
    /// Exactly one terminal event, and it is last. Returns it.
    fn assert_single_terminal(&self) -> &RunEvent;
    /// Concatenated partial deltas.
    fn partial_text(&self) -> String;
}

impl EventAssertions for [RunEvent] {
    fn assert_single_terminal(&self) -> &RunEvent {
        let terminals = self.iter().filter(|e| e.is_terminal()).count();
        assert_eq!(terminals, 1, "expected one terminal event in {self:?}");
        match self.last() {
            Some(last) if last.is_terminal() => last,
            _ => panic!("terminal event is not last in {self:?}"),
        }
    }

    fn partial_text(&self) -> String {
        self.iter()
            .filter(|e| !e.is_terminal())
            .map(RunEvent::text)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_terminal_must_be_last() {
        let events = vec![
            RunEvent::Partial("a".into()),
            RunEvent::Partial("b".into()),
            RunEvent::Completed("done".into()),
        ];
        assert_eq!(
            events.assert_single_terminal(),
            &RunEvent::Completed("done".into())
        );
        assert_eq!(events.partial_text(), "ab");
    }

    #[test]
    #[should_panic(expected = "expected one terminal event")]
    fn two_terminals_fail() {
        let events = [
            RunEvent::Completed("done".into()),
            RunEvent::Error("boom".into()),
        ];
        events.assert_single_terminal();
    }
}
