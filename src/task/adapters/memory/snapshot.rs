//! In-memory snapshot repository for task lifecycle tests.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::Task,
    ports::{TaskSnapshotError, TaskSnapshotRepository, TaskSnapshotResult},
};

/// Thread-safe in-memory task snapshot repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskSnapshotRepository {
    state: Arc<RwLock<InMemorySnapshotState>>,
}

#[derive(Debug, Default)]
struct InMemorySnapshotState {
    tasks: Vec<Task>,
    save_count: usize,
}

impl InMemoryTaskSnapshotRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-seeded with `tasks`.
    #[must_use]
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemorySnapshotState {
                tasks,
                save_count: 0,
            })),
        }
    }

    /// Returns the most recently saved snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`TaskSnapshotError::Persistence`] when the lock is poisoned.
    pub fn stored(&self) -> TaskSnapshotResult<Vec<Task>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.tasks.clone())
    }

    /// Returns how many saves have been performed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskSnapshotError::Persistence`] when the lock is poisoned.
    pub fn save_count(&self) -> TaskSnapshotResult<usize> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.save_count)
    }
}

fn poisoned<E: std::fmt::Display>(err: E) -> TaskSnapshotError {
    TaskSnapshotError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TaskSnapshotRepository for InMemoryTaskSnapshotRepository {
    async fn load(&self) -> TaskSnapshotResult<Vec<Task>> {
        self.stored()
    }

    async fn save(&self, tasks: &[Task]) -> TaskSnapshotResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.tasks = tasks.to_vec();
        state.save_count += 1;
        Ok(())
    }
}
