//! Task filtering, ordering and statistics.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::task::domain::{Task, TaskPriority, TaskStatus, TaskType};

/// Criteria a task must meet to be listed. Unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Required status.
    pub status: Option<TaskStatus>,
    /// Required priority.
    pub priority: Option<TaskPriority>,
    /// Required type.
    pub task_type: Option<TaskType>,
    /// Required assignee.
    pub assigned_to: Option<String>,
    /// Only open tasks past their due date.
    pub overdue: bool,
    /// Only open tasks due within the due-soon window.
    pub due_soon: bool,
    /// Case-insensitive substring of title or description.
    pub search: Option<String>,
}

impl TaskFilter {
    /// Creates a filter matching every task.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to a status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restricts to a priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Restricts to a type.
    #[must_use]
    pub const fn with_task_type(mut self, task_type: TaskType) -> Self {
        self.task_type = Some(task_type);
        self
    }

    /// Restricts to an assignee.
    #[must_use]
    pub fn with_assignee(mut self, assigned_to: impl Into<String>) -> Self {
        self.assigned_to = Some(assigned_to.into());
        self
    }

    /// Restricts to overdue tasks.
    #[must_use]
    pub const fn overdue_only(mut self) -> Self {
        self.overdue = true;
        self
    }

    /// Restricts to tasks due soon.
    #[must_use]
    pub const fn due_soon_only(mut self) -> Self {
        self.due_soon = true;
        self
    }

    /// Restricts to tasks mentioning `text`.
    #[must_use]
    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    fn matches(&self, task: &Task, now: DateTime<Utc>, due_soon_window: TimeDelta) -> bool {
        self.status.is_none_or(|status| task.status() == status)
            && self.priority.is_none_or(|priority| task.priority() == priority)
            && self.task_type.is_none_or(|task_type| task.task_type() == task_type)
            && self
                .assigned_to
                .as_deref()
                .is_none_or(|assignee| task.assigned_to() == Some(assignee))
            && (!self.overdue || task.is_overdue(now))
            && (!self.due_soon || task.is_due_within(now, due_soon_window))
            && self
                .search
                .as_deref()
                .is_none_or(|needle| mentions(task, needle))
    }
}

fn mentions(task: &Task, needle: &str) -> bool {
    let lowered = needle.trim().to_lowercase();
    task.title().to_lowercase().contains(&lowered)
        || task
            .description()
            .is_some_and(|description| description.to_lowercase().contains(&lowered))
}

/// Field used to order listed tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskSortKey {
    /// Urgent first.
    Priority,
    /// Workflow order: todo, in progress, on hold, completed, cancelled.
    Status,
    /// Earliest due first; tasks without a due date last.
    #[default]
    DueDate,
    /// Oldest first.
    CreatedAt,
    /// Least recently updated first.
    UpdatedAt,
    /// Lexicographic by title.
    Title,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Natural order of the key.
    #[default]
    Ascending,
    /// Reversed order of the key.
    Descending,
}

/// Filters `tasks` and sorts the survivors stably by `sort_key`.
///
/// Tasks comparing equal keep their input order in both directions.
#[must_use]
pub fn filter_tasks(
    tasks: &[Task],
    filter: &TaskFilter,
    sort_key: TaskSortKey,
    order: SortOrder,
    now: DateTime<Utc>,
    due_soon_window: TimeDelta,
) -> Vec<Task> {
    let mut selected: Vec<Task> = tasks
        .iter()
        .filter(|task| filter.matches(task, now, due_soon_window))
        .cloned()
        .collect();
    selected.sort_by(|left, right| compare(left, right, sort_key, order));
    selected
}

fn compare(left: &Task, right: &Task, sort_key: TaskSortKey, order: SortOrder) -> Ordering {
    let directed = |ordering: Ordering| match order {
        SortOrder::Ascending => ordering,
        SortOrder::Descending => ordering.reverse(),
    };
    match sort_key {
        TaskSortKey::Priority => directed(left.priority().rank().cmp(&right.priority().rank())),
        TaskSortKey::Status => directed(left.status().rank().cmp(&right.status().rank())),
        TaskSortKey::DueDate => match (left.due_date(), right.due_date()) {
            (Some(a), Some(b)) => directed(a.cmp(&b)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        TaskSortKey::CreatedAt => directed(left.created_at().cmp(&right.created_at())),
        TaskSortKey::UpdatedAt => directed(left.updated_at().cmp(&right.updated_at())),
        TaskSortKey::Title => directed(left.title().cmp(right.title())),
    }
}

/// Aggregate counts over a task list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskStatistics {
    /// Number of tasks.
    pub total: usize,
    /// Tasks per status.
    pub by_status: BTreeMap<TaskStatus, usize>,
    /// Tasks per priority.
    pub by_priority: BTreeMap<TaskPriority, usize>,
    /// Tasks per type.
    pub by_type: BTreeMap<TaskType, usize>,
    /// Open tasks past their due date.
    pub overdue: usize,
    /// Open tasks due within the due-soon window.
    pub due_soon: usize,
    /// Completed share in percent, rounded half-up; `0` for no tasks.
    pub completion_rate: u8,
}

/// Computes statistics for `tasks`.
#[must_use]
pub fn task_statistics(
    tasks: &[Task],
    now: DateTime<Utc>,
    due_soon_window: TimeDelta,
) -> TaskStatistics {
    let mut statistics = TaskStatistics {
        total: tasks.len(),
        ..TaskStatistics::default()
    };
    for task in tasks {
        *statistics.by_status.entry(task.status()).or_default() += 1;
        *statistics.by_priority.entry(task.priority()).or_default() += 1;
        *statistics.by_type.entry(task.task_type()).or_default() += 1;
        if task.is_overdue(now) {
            statistics.overdue += 1;
        }
        if task.is_due_within(now, due_soon_window) {
            statistics.due_soon += 1;
        }
    }

    let completed = statistics
        .by_status
        .get(&TaskStatus::Completed)
        .copied()
        .unwrap_or(0);
    statistics.completion_rate = percentage(completed, statistics.total);
    statistics
}

fn percentage(part: usize, total: usize) -> u8 {
    let rounded = (part * 200 + total).checked_div(total * 2).unwrap_or(0);
    u8::try_from(rounded.min(100)).unwrap_or(100)
}
