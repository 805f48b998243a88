//! Reminder settings attached to a due task.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// When to remind the assignee ahead of a task's due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderSettings {
    enabled: bool,
    minutes_before: u32,
}

impl ReminderSettings {
    /// Creates an enabled reminder firing `minutes_before` the due date.
    #[must_use]
    pub const fn before(minutes_before: u32) -> Self {
        Self {
            enabled: true,
            minutes_before,
        }
    }

    /// Returns a copy with the enabled flag replaced.
    #[must_use]
    pub const fn with_enabled(self, enabled: bool) -> Self {
        Self {
            enabled,
            minutes_before: self.minutes_before,
        }
    }

    /// Returns whether the reminder is active.
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        self.enabled
    }

    /// Returns the lead time in minutes.
    #[must_use]
    pub const fn minutes_before(self) -> u32 {
        self.minutes_before
    }

    /// Returns the instant the reminder becomes due for `due_date`.
    #[must_use]
    pub fn fire_at(self, due_date: DateTime<Utc>) -> DateTime<Utc> {
        due_date
            .checked_sub_signed(TimeDelta::minutes(i64::from(self.minutes_before)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}
