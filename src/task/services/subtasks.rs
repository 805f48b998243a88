//! Subtask discovery and cascade-completion eligibility.

use crate::task::domain::{Task, TaskId, TaskStatus};

use super::store::TaskTable;

/// Returns the direct subtasks of `parent_id`.
#[must_use]
pub fn subtasks_of(table: &TaskTable, parent_id: TaskId) -> Vec<Task> {
    table.children_of(parent_id).into_iter().cloned().collect()
}

/// Returns `true` when every direct subtask of `parent_id` is completed.
///
/// Vacuously `true` for a task without subtasks.
#[must_use]
pub fn all_subtasks_completed(table: &TaskTable, parent_id: TaskId) -> bool {
    table
        .children_of(parent_id)
        .iter()
        .all(|child| child.status() == TaskStatus::Completed)
}

/// Returns the parent to auto-complete after `child_id` completed.
///
/// Only the direct parent is considered. It qualifies when it exists, is
/// still open, and all of its subtasks are completed.
#[must_use]
pub fn cascade_target(table: &TaskTable, child_id: TaskId) -> Option<TaskId> {
    let parent_id = table.get(child_id)?.parent_task_id()?;
    let parent = table.get(parent_id)?;
    if parent.status().is_terminal() || !all_subtasks_completed(table, parent_id) {
        return None;
    }
    Some(parent_id)
}
