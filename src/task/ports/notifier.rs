//! Notification port used by the reminder sweep.

use crate::task::domain::Task;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Delivers reminder notifications for due tasks.
///
/// Delivery is fire-and-forget from the engine's point of view: failures
/// are logged per task and never retried.
#[async_trait]
pub trait ReminderNotifier: Send + Sync {
    /// Notifies the task's audience that its reminder is due.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError`] when delivery fails.
    async fn notify(&self, task: &Task) -> Result<(), NotificationError>;
}

/// Errors returned by reminder notifiers.
#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    /// The transport rejected or failed the delivery.
    #[error("notification delivery failed: {0}")]
    Delivery(Arc<dyn std::error::Error + Send + Sync>),

    /// Delivery did not finish within the configured timeout.
    #[error("notification timed out after {0:?}")]
    Timeout(Duration),
}

impl NotificationError {
    /// Wraps a delivery error.
    pub fn delivery(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Delivery(Arc::new(err))
    }
}
