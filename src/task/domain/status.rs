//! Task status state machine.

use super::ParseTaskFieldError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task has been created but work has not started.
    Todo,
    /// Task is being worked on.
    InProgress,
    /// Task work is temporarily paused.
    OnHold,
    /// Task has been completed.
    Completed,
    /// Task has been abandoned.
    Cancelled,
}

impl TaskStatus {
    /// All statuses in rank order.
    pub const ALL: [Self; 5] = [
        Self::Todo,
        Self::InProgress,
        Self::OnHold,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::OnHold => "on_hold",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns `true` for statuses no transition may leave.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Returns whether a transition from `self` to `target` is permitted.
    ///
    /// Active statuses move freely among each other and into either
    /// terminal status. Self-transitions are rejected.
    #[must_use]
    pub fn can_transition_to(self, target: Self) -> bool {
        !self.is_terminal() && self != target
    }

    /// Sort rank used by status ordering.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Todo => 0,
            Self::InProgress => 1,
            Self::OnHold => 2,
            Self::Completed => 3,
            Self::Cancelled => 4,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskFieldError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "todo" => Ok(Self::Todo),
            "in_progress" => Ok(Self::InProgress),
            "on_hold" => Ok(Self::OnHold),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseTaskFieldError::new("status", value)),
        }
    }
}
