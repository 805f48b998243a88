//! Notifier that records reminder deliveries in memory.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::task::{
    domain::{Task, TaskId},
    ports::{NotificationError, ReminderNotifier},
};

/// Reminder notifier that records which tasks were notified.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    notified: Arc<Mutex<Vec<TaskId>>>,
}

impl RecordingNotifier {
    /// Creates a notifier with an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the notified task identifiers in delivery order.
    #[must_use]
    pub fn notified(&self) -> Vec<TaskId> {
        self.notified
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ReminderNotifier for RecordingNotifier {
    async fn notify(&self, task: &Task) -> Result<(), NotificationError> {
        let mut log = self.notified.lock().map_err(|err| {
            NotificationError::delivery(std::io::Error::other(err.to_string()))
        })?;
        log.push(task.id());
        Ok(())
    }
}
