// src/scenario/state.rs
// Lifecycle of a run

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Run lifecycle. `Completed` and `Aborted` are terminal.
///
/// Pending -> Running at the first step; Running -> Completed when the plan
/// is exhausted; Running -> Aborted when a load-bearing step fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunState {
    #[default]
    Pending,
    Running,
    Completed,
    Aborted { step: String, reason: String },
}

impl RunState {
    /// Enter `Running`. No-op once running or terminal.
    pub fn start(&mut self) {
        if *self == RunState::Pending {
            *self = RunState::Running;
        }
    }

    /// Enter `Completed` unless already terminal
    pub fn complete(&mut self) {
        if !self.is_terminal() {
            *self = RunState::Completed;
        }
    }

    /// Enter `Aborted`. Only a running run can abort.
    pub fn abort(&mut self, step: &str, reason: impl Into<String>) {
        if *self == RunState::Running {
            *self = RunState::Aborted {
                step: step.to_string(),
                reason: reason.into(),
            };
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Completed | RunState::Aborted { .. })
    }

    pub fn is_completed(&self) -> bool {
        *self == RunState::Completed
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, RunState::Aborted { .. })
    }
}

impl Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Pending => write!(f, "pending"),
            RunState::Running => write!(f, "running"),
            RunState::Completed => write!(f, "completed"),
            RunState::Aborted { step, .. } => write!(f, "aborted at '{step}'"),
        }
    }
}
