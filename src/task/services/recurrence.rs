//! Recurring task generation.

use chrono::{DateTime, Utc};

use crate::task::domain::{Task, TaskStatus};

/// Returns `true` when completing `task` should spawn its next occurrence.
///
/// The task must be a completed recurring task with a rule whose end date
/// (if any) has not passed and whose occurrence cap (if any) has not been
/// reached.
#[must_use]
pub fn should_create_recurrence(task: &Task, now: DateTime<Utc>) -> bool {
    task.is_recurring()
        && task.status() == TaskStatus::Completed
        && task.recurrence().is_some_and(|rule| rule.permits_next(now))
}

/// Materialises the next instance of a completed recurring task.
///
/// The instance is due one step after the completed task's due date (or
/// after `now` when it had none) and links back to the series root.
/// Returns `None` when the task carries no recurrence rule.
#[must_use]
pub fn create_recurring_instance(completed: &Task, now: DateTime<Utc>) -> Option<Task> {
    let rule = completed.recurrence()?;
    let base = completed.due_date().unwrap_or(now);
    Some(completed.next_instance(rule.next_after(base), now))
}

/// Spawns the next occurrence when [`should_create_recurrence`] allows it.
#[must_use]
pub fn next_recurrence(completed: &Task, now: DateTime<Utc>) -> Option<Task> {
    if !should_create_recurrence(completed, now) {
        return None;
    }
    create_recurring_instance(completed, now)
}
