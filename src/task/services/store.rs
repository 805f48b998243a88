//! Authoritative in-memory task snapshot with a parent → children index.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::task::{
    domain::{Task, TaskId},
    ports::{TaskSnapshotError, TaskSnapshotRepository},
};

/// Errors raised by the task store.
#[derive(Debug, Clone, Error)]
pub enum TaskStoreError {
    /// A writer panicked while holding the store lock.
    #[error("task store lock poisoned")]
    Poisoned,
    /// Loading or saving the snapshot failed.
    #[error(transparent)]
    Snapshot(#[from] TaskSnapshotError),
}

/// Keyed task collection preserving insertion order.
///
/// Writes apply immediately, so callers validate before the first write of
/// a multi-step change. Every write bumps the revision used to order
/// snapshot saves.
#[derive(Debug, Default)]
pub struct TaskTable {
    tasks: HashMap<TaskId, Task>,
    order: Vec<TaskId>,
    children: HashMap<TaskId, Vec<TaskId>>,
    revision: u64,
}

impl TaskTable {
    fn from_tasks(tasks: Vec<Task>) -> Self {
        let mut table = Self::default();
        for task in tasks {
            table.upsert(task);
        }
        table.revision = 0;
        table
    }

    /// Returns the task with the given id.
    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    /// Returns the number of tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` when the table holds no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates tasks in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.order.iter().filter_map(|id| self.tasks.get(id))
    }

    /// Returns the tasks in insertion order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Task> {
        self.iter().cloned().collect()
    }

    /// Returns the direct children of `parent_id` in insertion order.
    #[must_use]
    pub fn children_of(&self, parent_id: TaskId) -> Vec<&Task> {
        self.children
            .get(&parent_id)
            .map(|ids| ids.iter().filter_map(|id| self.tasks.get(id)).collect())
            .unwrap_or_default()
    }

    /// Inserts a new task or replaces an existing one with the same id.
    pub fn upsert(&mut self, task: Task) {
        let id = task.id();
        let new_parent = task.parent_task_id();
        match self.tasks.insert(id, task) {
            Some(previous) => {
                let old_parent = previous.parent_task_id();
                if old_parent != new_parent {
                    if let Some(parent_id) = old_parent {
                        self.unlink_child(parent_id, id);
                    }
                    if let Some(parent_id) = new_parent {
                        self.children.entry(parent_id).or_default().push(id);
                    }
                }
            }
            None => {
                self.order.push(id);
                if let Some(parent_id) = new_parent {
                    self.children.entry(parent_id).or_default().push(id);
                }
            }
        }
        self.revision += 1;
    }

    /// Removes and returns a task.
    ///
    /// The removed task's own children keep their index entry so they stay
    /// discoverable under the now-dangling parent id.
    pub fn remove(&mut self, id: TaskId) -> Option<Task> {
        let removed = self.tasks.remove(&id)?;
        self.order.retain(|existing| *existing != id);
        if let Some(parent_id) = removed.parent_task_id() {
            self.unlink_child(parent_id, id);
        }
        self.revision += 1;
        Some(removed)
    }

    /// Replaces the whole table, rebuilding the index.
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        let revision = self.revision;
        *self = Self::from_tasks(tasks);
        self.revision = revision + 1;
    }

    fn unlink_child(&mut self, parent_id: TaskId, child_id: TaskId) {
        if let Some(ids) = self.children.get_mut(&parent_id) {
            ids.retain(|id| *id != child_id);
            if ids.is_empty() {
                self.children.remove(&parent_id);
            }
        }
    }
}

/// Single shared task store backed by a snapshot repository.
///
/// Constructed once with [`TaskStore::open`] and flushed with
/// [`TaskStore::close`]. Saves are serialised and skipped when a newer
/// revision has already been written.
pub struct TaskStore<P>
where
    P: TaskSnapshotRepository,
{
    table: RwLock<TaskTable>,
    persistence: Arc<P>,
    saved_revision: tokio::sync::Mutex<u64>,
    save_timeout: Duration,
}

impl<P> TaskStore<P>
where
    P: TaskSnapshotRepository,
{
    /// Loads the persisted snapshot into a new store.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Snapshot`] when loading fails or times out.
    pub async fn open(persistence: Arc<P>, save_timeout: Duration) -> Result<Self, TaskStoreError> {
        let tasks = match tokio::time::timeout(save_timeout, persistence.load()).await {
            Ok(loaded) => loaded?,
            Err(_) => return Err(TaskSnapshotError::Timeout(save_timeout).into()),
        };
        debug!(task_count = tasks.len(), "task store opened");
        Ok(Self {
            table: RwLock::new(TaskTable::from_tasks(tasks)),
            persistence,
            saved_revision: tokio::sync::Mutex::new(0),
            save_timeout,
        })
    }

    /// Creates an empty store without loading the backend.
    ///
    /// The first save replaces whatever the backend holds.
    #[must_use]
    pub fn empty(persistence: Arc<P>, save_timeout: Duration) -> Self {
        Self {
            table: RwLock::new(TaskTable::default()),
            persistence,
            saved_revision: tokio::sync::Mutex::new(0),
            save_timeout,
        }
    }

    /// Runs `f` against a read view of the table.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Poisoned`] when the lock is poisoned.
    pub fn read<T>(&self, f: impl FnOnce(&TaskTable) -> T) -> Result<T, TaskStoreError> {
        let table = self.table.read().map_err(|_| TaskStoreError::Poisoned)?;
        Ok(f(&table))
    }

    /// Runs `f` under the write lock; all its writes appear atomic to
    /// readers.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or a poisoned-lock error converted into
    /// `E`.
    pub fn write<T, E>(&self, f: impl FnOnce(&mut TaskTable) -> Result<T, E>) -> Result<T, E>
    where
        E: From<TaskStoreError>,
    {
        let mut table = self
            .table
            .write()
            .map_err(|_| E::from(TaskStoreError::Poisoned))?;
        f(&mut table)
    }

    /// Returns a copy of all tasks in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Poisoned`] when the lock is poisoned.
    pub fn snapshot(&self) -> Result<Vec<Task>, TaskStoreError> {
        self.read(TaskTable::to_vec)
    }

    /// Saves the current snapshot unless it has already been saved.
    ///
    /// In-memory state is never rolled back when saving fails.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Snapshot`] when the save fails or times
    /// out.
    pub async fn persist(&self) -> Result<(), TaskStoreError> {
        let mut saved_revision = self.saved_revision.lock().await;
        let (revision, snapshot) = self.read(|table| (table.revision, table.to_vec()))?;
        if revision <= *saved_revision {
            return Ok(());
        }

        match tokio::time::timeout(self.save_timeout, self.persistence.save(&snapshot)).await {
            Ok(saved) => saved?,
            Err(_) => return Err(TaskSnapshotError::Timeout(self.save_timeout).into()),
        }
        *saved_revision = revision;
        debug!(revision, task_count = snapshot.len(), "task snapshot saved");
        Ok(())
    }

    /// Flushes pending changes before shutdown.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Snapshot`] when the final save fails.
    pub async fn close(&self) -> Result<(), TaskStoreError> {
        self.persist().await
    }
}
