//! Repository port for whole-snapshot task persistence.

use crate::task::domain::Task;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for task snapshot operations.
pub type TaskSnapshotResult<T> = Result<T, TaskSnapshotError>;

/// Task persistence contract.
///
/// The engine persists its full task list after every mutation, so any
/// backend able to load and replace an ordered snapshot satisfies it.
#[async_trait]
pub trait TaskSnapshotRepository: Send + Sync {
    /// Loads the persisted snapshot. An empty store yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`TaskSnapshotError::Persistence`] when the backend cannot be
    /// read or decoded.
    async fn load(&self) -> TaskSnapshotResult<Vec<Task>>;

    /// Replaces the persisted snapshot with `tasks`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskSnapshotError::Persistence`] when the backend rejects
    /// the write.
    async fn save(&self, tasks: &[Task]) -> TaskSnapshotResult<()>;
}

/// Errors returned by snapshot repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskSnapshotError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),

    /// The backend did not answer within the configured timeout.
    #[error("persistence timed out after {0:?}")]
    Timeout(Duration),
}

impl TaskSnapshotError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
