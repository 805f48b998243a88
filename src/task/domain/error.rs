//! Error types for task domain validation and parsing.

use super::{ChecklistItemId, TaskId, TaskStatus};
use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The requested status transition is not permitted.
    #[error("task {task_id} cannot transition from {from} to {to}")]
    InvalidStateTransition {
        /// Task being transitioned.
        task_id: TaskId,
        /// Current status.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
    },

    /// A recurrence interval of zero was supplied.
    #[error("recurrence interval must be at least 1, got {0}")]
    InvalidRecurrenceInterval(u32),

    /// A weekday outside `0..=6` was supplied for a custom recurrence.
    #[error("invalid weekday {0}, expected 0 (Sunday) to 6 (Saturday)")]
    InvalidWeekday(u8),

    /// A checklist item text is empty after trimming.
    #[error("checklist item text must not be empty")]
    EmptyChecklistText,

    /// The checklist item does not exist on the task.
    #[error("checklist item {item_id} not found on task {task_id}")]
    ChecklistItemNotFound {
        /// Task owning the checklist.
        task_id: TaskId,
        /// Missing checklist item.
        item_id: ChecklistItemId,
    },

    /// A task was asked to depend on itself.
    #[error("task {0} cannot depend on itself")]
    SelfDependency(TaskId),

    /// A task was asked to become its own parent.
    #[error("task {0} cannot be its own parent")]
    SelfParent(TaskId),

    /// A stored or imported task contradicts the task model.
    #[error("task {task_id} is inconsistent: {reason}")]
    InconsistentTask {
        /// Offending task.
        task_id: TaskId,
        /// Which rule the task breaks.
        reason: &'static str,
    },
}

/// Error returned while parsing task enum fields from text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task {field}: {value}")]
pub struct ParseTaskFieldError {
    /// Name of the field being parsed.
    pub field: &'static str,
    /// Rejected input.
    pub value: String,
}

impl ParseTaskFieldError {
    pub(crate) fn new(field: &'static str, value: &str) -> Self {
        Self {
            field,
            value: value.to_owned(),
        }
    }
}
