//! Task lifecycle orchestration.
//!
//! Every mutation runs as one transaction under the store's write lock:
//! the task change, the recurrence spawn and the parent cascade become
//! visible together. The snapshot is persisted afterwards; a failed save
//! is reported but the in-memory change stands.

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::task::{
    domain::{
        ChecklistItem, ChecklistItemId, ChecklistItemUpdate, Task, TaskDomainError, TaskId,
        TaskPatch, TaskStatus,
    },
    ports::{
        ReminderNotifier, TaskSnapshotError, TaskSnapshotRepository, TaskTemplateCatalog,
        TaskTemplateError,
    },
};

use super::{
    CreateTaskRequest, DependencyStatus, ReminderScheduler, SortOrder, TaskEngineConfig,
    TaskExport, TaskFilter, TaskSortKey, TaskStatistics, TaskTransferError,
    dependency::dependency_status,
    filter_tasks,
    recurrence::next_recurrence,
    resolve_template,
    store::{TaskStore, TaskStoreError, TaskTable},
    subtasks::{self, cascade_target},
    task_statistics,
};

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation failed; nothing was changed.
    #[error(transparent)]
    Validation(#[from] TaskDomainError),

    /// No task has the given id.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Reserved for dependency cycle detection, which is not performed.
    #[error("dependency cycle through task {0}")]
    Cycle(TaskId),

    /// The change was applied in memory but could not be saved.
    #[error("task change not persisted: {0}")]
    Persistence(TaskSnapshotError),

    /// Template lookup or rendering failed.
    #[error(transparent)]
    Template(#[from] TaskTemplateError),

    /// An export document could not be encoded or decoded.
    #[error(transparent)]
    Snapshot(#[from] TaskTransferError),

    /// A writer panicked while holding the store lock.
    #[error("task store lock poisoned")]
    StorePoisoned,
}

impl From<TaskStoreError> for TaskLifecycleError {
    fn from(err: TaskStoreError) -> Self {
        match err {
            TaskStoreError::Poisoned => Self::StorePoisoned,
            TaskStoreError::Snapshot(source) => Self::Persistence(source),
        }
    }
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Result of completing a task, including the completion side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCompletion {
    /// The task after the operation.
    pub task: Task,
    /// Next instance spawned for a recurring task.
    pub next_occurrence: Option<Task>,
    /// Parent completed because its last open subtask completed.
    pub completed_parent: Option<Task>,
}

impl TaskCompletion {
    const fn only(task: Task) -> Self {
        Self {
            task,
            next_occurrence: None,
            completed_parent: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    Unchanged,
    Modified,
    Completed,
}

impl From<bool> for Change {
    fn from(completed: bool) -> Self {
        if completed {
            Self::Completed
        } else {
            Self::Modified
        }
    }
}

/// Task lifecycle orchestration service.
pub struct TaskLifecycleManager<P, C>
where
    P: TaskSnapshotRepository,
    C: Clock + Send + Sync,
{
    store: Arc<TaskStore<P>>,
    clock: Arc<C>,
    config: TaskEngineConfig,
}

impl<P, C> TaskLifecycleManager<P, C>
where
    P: TaskSnapshotRepository,
    C: Clock + Send + Sync,
{
    /// Creates a manager over an already opened store.
    #[must_use]
    pub const fn new(store: Arc<TaskStore<P>>, clock: Arc<C>, config: TaskEngineConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Loads the persisted snapshot and creates a manager over it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Persistence`] when loading fails.
    pub async fn open(
        persistence: Arc<P>,
        clock: Arc<C>,
        config: TaskEngineConfig,
    ) -> TaskLifecycleResult<Self> {
        let store = TaskStore::open(persistence, config.collaborator_timeout()).await?;
        Ok(Self::new(Arc::new(store), clock, config))
    }

    /// Returns the shared store.
    #[must_use]
    pub const fn store(&self) -> &Arc<TaskStore<P>> {
        &self.store
    }

    /// Returns the engine configuration.
    #[must_use]
    pub const fn config(&self) -> &TaskEngineConfig {
        &self.config
    }

    /// Builds a reminder scheduler sharing this manager's store and clock.
    #[must_use]
    pub fn reminder_scheduler<N>(&self, notifier: Arc<N>) -> ReminderScheduler<P, N, C>
    where
        N: ReminderNotifier,
    {
        ReminderScheduler::new(
            Arc::clone(&self.store),
            notifier,
            Arc::clone(&self.clock),
            self.config.collaborator_timeout(),
        )
    }

    /// Creates a new task.
    ///
    /// A request whose checklist is already fully ticked creates a
    /// completed task and runs the completion effects.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Validation`] for a blank title and
    /// [`TaskLifecycleError::Persistence`] when the save fails.
    pub async fn create_task(&self, request: CreateTaskRequest) -> TaskLifecycleResult<Task> {
        let now = self.clock.utc();
        let draft = request.into_draft(self.config.default_estimated_duration_minutes);
        let task = Task::create(draft, now)?;
        let completion = self.store.write(|table| {
            table.upsert(task.clone());
            if task.status() == TaskStatus::Completed {
                self.completion_effects(table, task.clone(), now).map(Some)
            } else {
                Ok(None)
            }
        })?;
        debug!(task_id = %task.id(), task_type = %task.task_type(), "task created");
        if let Some(effects) = &completion {
            log_completion(effects);
        }
        self.persist().await?;
        Ok(completion.map_or(task, |effects| effects.task))
    }

    /// Creates a task from a catalogue prototype rendered against
    /// `context`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Template`] for an unknown key or a
    /// render failure, otherwise as [`Self::create_task`].
    pub async fn create_from_template<T>(
        &self,
        catalog: &T,
        key: &str,
        context: &Map<String, Value>,
    ) -> TaskLifecycleResult<Task>
    where
        T: TaskTemplateCatalog + ?Sized,
    {
        let request = resolve_template(catalog, key, context)?;
        self.create_task(request).await
    }

    /// Applies a patch to a task.
    ///
    /// A patch that moves the task to completed, directly or through a
    /// fully ticked checklist, runs the completion effects.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for an unknown id,
    /// [`TaskLifecycleError::Validation`] for an invalid patch, and
    /// [`TaskLifecycleError::Persistence`] when the save fails.
    pub async fn update_task(&self, id: TaskId, patch: TaskPatch) -> TaskLifecycleResult<Task> {
        let completion = self
            .commit(id, |task, now| Ok(task.apply_patch(patch, now)?.completed.into()))
            .await?;
        Ok(completion.task)
    }

    /// Completes a task and runs the completion effects.
    ///
    /// Completing an already completed task returns it unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for an unknown id,
    /// [`TaskLifecycleError::Validation`] for a cancelled task, and
    /// [`TaskLifecycleError::Persistence`] when the save fails.
    pub async fn complete_task(&self, id: TaskId) -> TaskLifecycleResult<TaskCompletion> {
        self.commit(id, |task, now| {
            if task.complete(now)? {
                Ok(Change::Completed)
            } else {
                Ok(Change::Unchanged)
            }
        })
        .await
    }

    /// Removes a task and returns it.
    ///
    /// Subtasks and dependents keep their now-dangling references.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for an unknown id and
    /// [`TaskLifecycleError::Persistence`] when the save fails.
    pub async fn delete_task(&self, id: TaskId) -> TaskLifecycleResult<Task> {
        let removed = self
            .store
            .write(|table| table.remove(id).ok_or(TaskLifecycleError::NotFound(id)))?;
        debug!(task_id = %id, "task deleted");
        self.persist().await?;
        Ok(removed)
    }

    /// Appends a checklist item.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Validation`] for blank text, otherwise
    /// as [`Self::update_task`].
    pub async fn add_checklist_item(
        &self,
        id: TaskId,
        text: impl Into<String>,
    ) -> TaskLifecycleResult<Task> {
        let item = ChecklistItem::new(text)?;
        let completion = self
            .commit(id, |task, now| {
                let checklist = task.checklist_with_added(item);
                patch_checklist(task, checklist, now)
            })
            .await?;
        Ok(completion.task)
    }

    /// Removes a checklist item.
    ///
    /// Removing the last open item of an otherwise ticked checklist
    /// completes the task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Validation`] when the item is not on
    /// the task, otherwise as [`Self::update_task`].
    pub async fn remove_checklist_item(
        &self,
        id: TaskId,
        item_id: ChecklistItemId,
    ) -> TaskLifecycleResult<Task> {
        let completion = self
            .commit(id, |task, now| {
                let checklist = task.checklist_without(item_id)?;
                patch_checklist(task, checklist, now)
            })
            .await?;
        Ok(completion.task)
    }

    /// Updates the text or completion flag of a checklist item.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Validation`] when the item is not on
    /// the task or the new text is blank, otherwise as
    /// [`Self::update_task`].
    pub async fn update_checklist_item(
        &self,
        id: TaskId,
        item_id: ChecklistItemId,
        update: ChecklistItemUpdate,
    ) -> TaskLifecycleResult<Task> {
        let completion = self
            .commit(id, |task, now| {
                let checklist = task.checklist_with_update(item_id, update)?;
                patch_checklist(task, checklist, now)
            })
            .await?;
        Ok(completion.task)
    }

    /// Declares that `id` depends on `dependency`.
    ///
    /// The dependency is not required to exist; unknown dependencies block.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Validation`] for a self-dependency,
    /// otherwise as [`Self::update_task`].
    pub async fn add_dependency(
        &self,
        id: TaskId,
        dependency: TaskId,
    ) -> TaskLifecycleResult<Task> {
        let completion = self
            .commit(id, |task, now| {
                if task.add_dependency(dependency, now)? {
                    Ok(Change::Modified)
                } else {
                    Ok(Change::Unchanged)
                }
            })
            .await?;
        Ok(completion.task)
    }

    /// Removes a declared dependency.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for an unknown task and
    /// [`TaskLifecycleError::Persistence`] when the save fails.
    pub async fn remove_dependency(
        &self,
        id: TaskId,
        dependency: TaskId,
    ) -> TaskLifecycleResult<Task> {
        let completion = self
            .commit(id, |task, now| {
                if task.remove_dependency(dependency, now) {
                    Ok(Change::Modified)
                } else {
                    Ok(Change::Unchanged)
                }
            })
            .await?;
        Ok(completion.task)
    }

    /// Returns a task by id.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::StorePoisoned`] when the store lock is
    /// poisoned.
    pub fn get_task(&self, id: TaskId) -> TaskLifecycleResult<Option<Task>> {
        Ok(self.store.read(|table| table.get(id).cloned())?)
    }

    /// Returns every task in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::StorePoisoned`] when the store lock is
    /// poisoned.
    pub fn list_tasks(&self) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self.store.snapshot()?)
    }

    /// Returns the direct subtasks of `parent_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::StorePoisoned`] when the store lock is
    /// poisoned.
    pub fn subtasks_of(&self, parent_id: TaskId) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self.store.read(|table| subtasks::subtasks_of(table, parent_id))?)
    }

    /// Returns `true` when every direct subtask of `parent_id` is
    /// completed, including when it has none.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::StorePoisoned`] when the store lock is
    /// poisoned.
    pub fn all_subtasks_completed(&self, parent_id: TaskId) -> TaskLifecycleResult<bool> {
        Ok(self
            .store
            .read(|table| subtasks::all_subtasks_completed(table, parent_id))?)
    }

    /// Resolves which direct dependencies still block a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for an unknown id.
    pub fn dependency_status(&self, id: TaskId) -> TaskLifecycleResult<DependencyStatus> {
        self.store
            .read(|table| {
                table
                    .get(id)
                    .map(|task| dependency_status(task, |dependency| table.get(dependency)))
            })?
            .ok_or(TaskLifecycleError::NotFound(id))
    }

    /// Lists the tasks matching `filter`, sorted stably.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::StorePoisoned`] when the store lock is
    /// poisoned.
    pub fn get_filtered_tasks(
        &self,
        filter: &TaskFilter,
        sort_by: TaskSortKey,
        order: SortOrder,
    ) -> TaskLifecycleResult<Vec<Task>> {
        let tasks = self.store.snapshot()?;
        Ok(filter_tasks(
            &tasks,
            filter,
            sort_by,
            order,
            self.clock.utc(),
            self.config.due_soon_window(),
        ))
    }

    /// Computes statistics for an arbitrary task list.
    #[must_use]
    pub fn get_statistics(&self, tasks: &[Task]) -> TaskStatistics {
        task_statistics(tasks, self.clock.utc(), self.config.due_soon_window())
    }

    /// Computes statistics for every stored task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::StorePoisoned`] when the store lock is
    /// poisoned.
    pub fn statistics(&self) -> TaskLifecycleResult<TaskStatistics> {
        let tasks = self.store.snapshot()?;
        Ok(self.get_statistics(&tasks))
    }

    /// Serialises every task into a versioned export document.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Snapshot`] when encoding fails.
    pub fn export_tasks(&self) -> TaskLifecycleResult<String> {
        let tasks = self.store.snapshot()?;
        Ok(TaskExport::new(tasks, self.clock.utc()).to_json()?)
    }

    /// Replaces every task with the contents of an export document.
    ///
    /// Returns the number of imported tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Snapshot`] for a malformed or
    /// unsupported document, leaving the store untouched, and
    /// [`TaskLifecycleError::Persistence`] when the save fails.
    pub async fn import_tasks(&self, raw: &str) -> TaskLifecycleResult<usize> {
        let document = TaskExport::from_json(raw)?;
        let count = document.tasks.len();
        self.store.write(|table| {
            table.replace_all(document.tasks);
            Ok::<_, TaskLifecycleError>(())
        })?;
        info!(task_count = count, exported_at = %document.exported_at, "tasks imported");
        self.persist().await?;
        Ok(count)
    }

    /// Flushes pending changes.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Persistence`] when the final save
    /// fails.
    pub async fn close(&self) -> TaskLifecycleResult<()> {
        Ok(self.store.close().await?)
    }

    async fn commit<F>(&self, id: TaskId, change: F) -> TaskLifecycleResult<TaskCompletion>
    where
        F: FnOnce(&mut Task, DateTime<Utc>) -> Result<Change, TaskDomainError>,
    {
        let now = self.clock.utc();
        let (completion, outcome) = self.store.write(|table| {
            let mut task = table.get(id).cloned().ok_or(TaskLifecycleError::NotFound(id))?;
            let outcome = change(&mut task, now)?;
            let completion = match outcome {
                Change::Unchanged => TaskCompletion::only(task),
                Change::Modified => {
                    table.upsert(task.clone());
                    TaskCompletion::only(task)
                }
                Change::Completed => {
                    table.upsert(task.clone());
                    self.completion_effects(table, task, now)?
                }
            };
            Ok::<_, TaskLifecycleError>((completion, outcome))
        })?;
        match outcome {
            Change::Unchanged => return Ok(completion),
            Change::Modified => {
                debug!(task_id = %id, status = %completion.task.status(), "task updated");
            }
            Change::Completed => log_completion(&completion),
        }
        self.persist().await?;
        Ok(completion)
    }

    /// Spawns the next recurrence, then cascades to the direct parent.
    fn completion_effects(
        &self,
        table: &mut TaskTable,
        task: Task,
        now: DateTime<Utc>,
    ) -> TaskLifecycleResult<TaskCompletion> {
        let next_occurrence = next_recurrence(&task, now);
        if let Some(instance) = &next_occurrence {
            table.upsert(instance.clone());
        }

        let completed_parent = if self.config.auto_complete_parent {
            complete_parent(table, task.id(), now)?
        } else {
            None
        };

        Ok(TaskCompletion {
            task,
            next_occurrence,
            completed_parent,
        })
    }

    async fn persist(&self) -> TaskLifecycleResult<()> {
        Ok(self.store.persist().await?)
    }
}

fn patch_checklist(
    task: &mut Task,
    checklist: Vec<ChecklistItem>,
    now: DateTime<Utc>,
) -> Result<Change, TaskDomainError> {
    let outcome = task.apply_patch(TaskPatch::new().with_checklist(checklist), now)?;
    Ok(outcome.completed.into())
}

fn complete_parent(
    table: &mut TaskTable,
    child_id: TaskId,
    now: DateTime<Utc>,
) -> TaskLifecycleResult<Option<Task>> {
    let Some(mut parent) = cascade_target(table, child_id).and_then(|id| table.get(id).cloned())
    else {
        return Ok(None);
    };
    parent.complete(now)?;
    table.upsert(parent.clone());
    Ok(Some(parent))
}

fn log_completion(completion: &TaskCompletion) {
    let task_id = completion.task.id();
    info!(task_id = %task_id, "task completed");
    if let Some(instance) = &completion.next_occurrence {
        info!(
            task_id = %task_id,
            next_task_id = %instance.id(),
            due_date = ?instance.due_date(),
            "recurring task instance created"
        );
    }
    if let Some(parent) = &completion.completed_parent {
        info!(task_id = %task_id, parent_id = %parent.id(), "parent task auto-completed");
    }
}
