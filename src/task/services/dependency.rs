//! Direct dependency blocking.

use serde::Serialize;

use crate::task::domain::{Task, TaskId, TaskStatus};

/// Whether a task may start, and which dependencies hold it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyStatus {
    /// `true` when nothing blocks the task.
    pub can_start: bool,
    /// Blocking dependencies in declaration order.
    pub blocked_by: Vec<TaskId>,
}

/// Resolves the blocking status of `task` against `lookup`.
///
/// A dependency blocks when it is not completed, or when `lookup` does not
/// know it. Only direct dependencies are checked; a completed dependency is
/// never inspected for blockers of its own.
#[must_use]
pub fn dependency_status<'a, F>(task: &Task, lookup: F) -> DependencyStatus
where
    F: Fn(TaskId) -> Option<&'a Task>,
{
    let blocked_by: Vec<TaskId> = task
        .dependencies()
        .iter()
        .copied()
        .filter(|dependency| {
            lookup(*dependency).is_none_or(|found| found.status() != TaskStatus::Completed)
        })
        .collect();

    DependencyStatus {
        can_start: blocked_by.is_empty(),
        blocked_by,
    }
}

/// Resolves the blocking status of `task` against a task slice.
#[must_use]
pub fn dependency_status_in(task: &Task, all_tasks: &[Task]) -> DependencyStatus {
    dependency_status(task, |id| all_tasks.iter().find(|candidate| candidate.id() == id))
}
