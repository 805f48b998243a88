//! Application services for task lifecycle orchestration.

mod config;
mod dependency;
mod lifecycle;
mod query;
mod recurrence;
mod reminder;
mod request;
pub mod store;
mod subtasks;
mod template;
mod transfer;

pub use config::TaskEngineConfig;
pub use dependency::{DependencyStatus, dependency_status, dependency_status_in};
pub use lifecycle::{TaskCompletion, TaskLifecycleError, TaskLifecycleManager, TaskLifecycleResult};
pub use query::{SortOrder, TaskFilter, TaskSortKey, TaskStatistics, filter_tasks, task_statistics};
pub use recurrence::{create_recurring_instance, next_recurrence, should_create_recurrence};
pub use reminder::{ReminderJob, ReminderScheduler, ReminderSweepReport};
pub use request::CreateTaskRequest;
pub use store::{TaskStore, TaskStoreError, TaskTable};
pub use subtasks::{all_subtasks_completed, cascade_target, subtasks_of};
pub use template::{render_prototype, resolve_template};
pub use transfer::{EXPORT_FORMAT_VERSION, TaskExport, TaskTransferError};
