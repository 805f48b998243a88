//! Partial updates applied to an existing task.

use super::{
    ChecklistItem, EntityRef, RecurrenceRule, ReminderSettings, TaskId, TaskPriority, TaskStatus,
    TaskType,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// Field-wise patch for a task.
///
/// `None` leaves a field untouched. Fields that are optional on the task use
/// a nested `Option`, where `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement description.
    pub description: Option<Option<String>>,
    /// Replacement task type.
    pub task_type: Option<TaskType>,
    /// Replacement priority.
    pub priority: Option<TaskPriority>,
    /// Requested status.
    pub status: Option<TaskStatus>,
    /// Replacement due date.
    pub due_date: Option<Option<DateTime<Utc>>>,
    /// Replacement estimated duration in minutes.
    pub estimated_duration_minutes: Option<u32>,
    /// Replacement assignee.
    pub assigned_to: Option<Option<String>>,
    /// Replacement checklist; triggers a progress recompute.
    pub checklist: Option<Vec<ChecklistItem>>,
    /// Replacement tag set.
    pub tags: Option<BTreeSet<String>>,
    /// Replacement business record reference.
    pub entity: Option<Option<EntityRef>>,
    /// Replacement parent task.
    pub parent_task_id: Option<Option<TaskId>>,
    /// Replacement dependency list.
    pub dependencies: Option<Vec<TaskId>>,
    /// Replacement recurring flag.
    pub recurring: Option<bool>,
    /// Replacement recurrence rule.
    pub recurrence: Option<Option<RecurrenceRule>>,
    /// Replacement reminder settings.
    pub reminder: Option<Option<ReminderSettings>>,
}

impl TaskPatch {
    /// Creates an empty patch.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            title: None,
            description: None,
            task_type: None,
            priority: None,
            status: None,
            due_date: None,
            estimated_duration_minutes: None,
            assigned_to: None,
            checklist: None,
            tags: None,
            entity: None,
            parent_task_id: None,
            dependencies: None,
            recurring: None,
            recurrence: None,
            reminder: None,
        }
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets or clears the description.
    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    /// Sets the task type.
    #[must_use]
    pub const fn with_task_type(mut self, task_type: TaskType) -> Self {
        self.task_type = Some(task_type);
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Requests a status transition.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets or clears the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: Option<DateTime<Utc>>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the estimated duration.
    #[must_use]
    pub const fn with_estimated_duration(mut self, minutes: u32) -> Self {
        self.estimated_duration_minutes = Some(minutes);
        self
    }

    /// Sets or clears the assignee.
    #[must_use]
    pub fn with_assignee(mut self, assigned_to: Option<String>) -> Self {
        self.assigned_to = Some(assigned_to);
        self
    }

    /// Replaces the checklist.
    #[must_use]
    pub fn with_checklist(mut self, checklist: Vec<ChecklistItem>) -> Self {
        self.checklist = Some(checklist);
        self
    }

    /// Replaces the tag set.
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.tags = Some(tags.into_iter().collect());
        self
    }

    /// Sets or clears the business record reference.
    #[must_use]
    pub fn with_entity(mut self, entity: Option<EntityRef>) -> Self {
        self.entity = Some(entity);
        self
    }

    /// Sets or clears the parent task.
    #[must_use]
    pub const fn with_parent(mut self, parent_task_id: Option<TaskId>) -> Self {
        self.parent_task_id = Some(parent_task_id);
        self
    }

    /// Replaces the dependency list.
    #[must_use]
    pub fn with_dependencies(mut self, dependencies: impl IntoIterator<Item = TaskId>) -> Self {
        self.dependencies = Some(dependencies.into_iter().collect());
        self
    }

    /// Sets the recurring flag.
    #[must_use]
    pub const fn with_recurring(mut self, recurring: bool) -> Self {
        self.recurring = Some(recurring);
        self
    }

    /// Sets or clears the recurrence rule.
    #[must_use]
    pub fn with_recurrence(mut self, recurrence: Option<RecurrenceRule>) -> Self {
        self.recurrence = Some(recurrence);
        self
    }

    /// Sets or clears the reminder.
    #[must_use]
    pub const fn with_reminder(mut self, reminder: Option<ReminderSettings>) -> Self {
        self.reminder = Some(reminder);
        self
    }
}

/// Partial update of a single checklist item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecklistItemUpdate {
    /// Replacement text.
    pub text: Option<String>,
    /// Replacement completion flag.
    pub completed: Option<bool>,
}

impl ChecklistItemUpdate {
    /// Marks the item completed or not.
    #[must_use]
    pub const fn completed(completed: bool) -> Self {
        Self {
            text: None,
            completed: Some(completed),
        }
    }

    /// Replaces the item text.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            completed: None,
        }
    }
}
