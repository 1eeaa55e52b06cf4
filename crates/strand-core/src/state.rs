//! Run lifecycle state machine.
//!
//! ```text
//! Idle -> Running -> { Finished | Error | BudgetExceeded }
//!            ^  |
//!            +--+
//! ```

use crate::error::StateError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a single run. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Created, no step taken yet.
    #[default]
    Idle,
    /// Stepping.
    Running,
    /// Completed: the model needed no further action or requested termination.
    Finished,
    /// Failed: model failure, internal fault, cancellation or timeout.
    Error,
    /// The step budget ran out while the run was still going.
    BudgetExceeded,
}

impl RunState {
    /// `true` for the three states a run ends in.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunState::Finished | RunState::Error | RunState::BudgetExceeded
        )
    }

    /// Whether the machine allows moving from `self` to `to`.
    pub fn can_transition(self, to: RunState) -> bool {
        matches!(
            (self, to),
            (RunState::Idle, RunState::Running)
                | (RunState::Running, RunState::Running)
                | (RunState::Running, RunState::Finished)
                | (RunState::Running, RunState::Error)
                | (RunState::Running, RunState::BudgetExceeded)
        )
    }

    /// Move to `to`, or report the illegal transition.
    pub fn transition(self, to: RunState) -> Result<RunState, StateError> {
        if self.can_transition(to) {
            Ok(to)
        } else {
            Err(StateError { from: self, to })
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Finished => "finished",
            RunState::Error => "error",
            RunState::BudgetExceeded => "budget_exceeded",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
