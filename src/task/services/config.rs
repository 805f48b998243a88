//! Engine configuration.

use chrono::TimeDelta;
use serde::Deserialize;
use std::time::Duration;

/// Tunables for the task lifecycle engine.
///
/// Every field has a default, so a partial JSON document (or `{}`) is a
/// valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TaskEngineConfig {
    /// Complete a parent automatically once all its subtasks complete.
    pub auto_complete_parent: bool,
    /// Estimated duration assigned when a create request omits one.
    pub default_estimated_duration_minutes: u32,
    /// Period of the reminder sweep.
    pub reminder_interval_secs: u64,
    /// Horizon for the "due soon" filter and statistic.
    pub due_soon_window_hours: u32,
    /// Upper bound on each persistence or notification call.
    pub collaborator_timeout_ms: u64,
}

impl Default for TaskEngineConfig {
    fn default() -> Self {
        Self {
            auto_complete_parent: true,
            default_estimated_duration_minutes: 30,
            reminder_interval_secs: 60,
            due_soon_window_hours: 24,
            collaborator_timeout_ms: 5_000,
        }
    }
}

impl TaskEngineConfig {
    /// Parses a configuration from JSON, filling omitted fields with
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error for malformed input.
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Enables or disables parent cascade completion.
    #[must_use]
    pub const fn with_auto_complete_parent(mut self, enabled: bool) -> Self {
        self.auto_complete_parent = enabled;
        self
    }

    /// Sets the default estimated duration.
    #[must_use]
    pub const fn with_default_estimated_duration(mut self, minutes: u32) -> Self {
        self.default_estimated_duration_minutes = minutes;
        self
    }

    /// Sets the reminder sweep period.
    #[must_use]
    pub const fn with_reminder_interval(mut self, interval: Duration) -> Self {
        self.reminder_interval_secs = interval.as_secs();
        self
    }

    /// Sets the collaborator timeout.
    #[must_use]
    pub fn with_collaborator_timeout(mut self, timeout: Duration) -> Self {
        self.collaborator_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Returns the reminder sweep period, never shorter than one second.
    #[must_use]
    pub fn reminder_interval(&self) -> Duration {
        Duration::from_secs(self.reminder_interval_secs.max(1))
    }

    /// Returns the "due soon" horizon.
    #[must_use]
    pub fn due_soon_window(&self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.due_soon_window_hours))
    }

    /// Returns the per-call collaborator timeout.
    #[must_use]
    pub const fn collaborator_timeout(&self) -> Duration {
        Duration::from_millis(self.collaborator_timeout_ms)
    }
}
