//! Request payload for creating tasks.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

use crate::task::domain::{
    ChecklistItem, EntityRef, RecurrenceRule, ReminderSettings, TaskDraft, TaskId, TaskPriority,
    TaskType,
};

/// Request payload for [`super::TaskLifecycleManager::create_task`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    task_type: TaskType,
    description: Option<String>,
    priority: TaskPriority,
    due_date: Option<DateTime<Utc>>,
    estimated_duration_minutes: Option<u32>,
    assigned_to: Option<String>,
    checklist: Vec<ChecklistItem>,
    tags: BTreeSet<String>,
    entity: Option<EntityRef>,
    parent_task_id: Option<TaskId>,
    dependencies: Vec<TaskId>,
    recurrence: Option<RecurrenceRule>,
    reminder: Option<ReminderSettings>,
}

impl CreateTaskRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(title: impl Into<String>, task_type: TaskType) -> Self {
        Self {
            title: title.into(),
            task_type,
            description: None,
            priority: TaskPriority::default(),
            due_date: None,
            estimated_duration_minutes: None,
            assigned_to: None,
            checklist: Vec::new(),
            tags: BTreeSet::new(),
            entity: None,
            parent_task_id: None,
            dependencies: Vec::new(),
            recurrence: None,
            reminder: None,
        }
    }

    /// Returns the requested title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the requested description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the requested checklist.
    #[must_use]
    pub fn checklist(&self) -> &[ChecklistItem] {
        &self.checklist
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the estimated effort in minutes.
    #[must_use]
    pub const fn with_estimated_duration(mut self, minutes: u32) -> Self {
        self.estimated_duration_minutes = Some(minutes);
        self
    }

    /// Sets the assignee.
    #[must_use]
    pub fn with_assignee(mut self, assigned_to: impl Into<String>) -> Self {
        self.assigned_to = Some(assigned_to.into());
        self
    }

    /// Sets the checklist.
    #[must_use]
    pub fn with_checklist(mut self, items: impl IntoIterator<Item = ChecklistItem>) -> Self {
        self.checklist = items.into_iter().collect();
        self
    }

    /// Sets the tags.
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    /// Links the task to a business record.
    #[must_use]
    pub fn with_entity(mut self, entity: EntityRef) -> Self {
        self.entity = Some(entity);
        self
    }

    /// Makes the task a subtask of `parent_task_id`.
    #[must_use]
    pub const fn with_parent(mut self, parent_task_id: TaskId) -> Self {
        self.parent_task_id = Some(parent_task_id);
        self
    }

    /// Sets the dependencies.
    #[must_use]
    pub fn with_dependencies(mut self, dependencies: impl IntoIterator<Item = TaskId>) -> Self {
        self.dependencies = dependencies.into_iter().collect();
        self
    }

    /// Makes the task recurring.
    #[must_use]
    pub fn with_recurrence(mut self, recurrence: RecurrenceRule) -> Self {
        self.recurrence = Some(recurrence);
        self
    }

    /// Sets the reminder.
    #[must_use]
    pub const fn with_reminder(mut self, reminder: ReminderSettings) -> Self {
        self.reminder = Some(reminder);
        self
    }

    pub(super) fn into_draft(self, default_estimated_duration_minutes: u32) -> TaskDraft {
        TaskDraft {
            title: self.title,
            description: self.description,
            task_type: self.task_type,
            priority: self.priority,
            due_date: self.due_date,
            estimated_duration_minutes: self
                .estimated_duration_minutes
                .unwrap_or(default_estimated_duration_minutes),
            assigned_to: self.assigned_to,
            checklist: self.checklist,
            tags: self.tags,
            entity: self.entity,
            parent_task_id: self.parent_task_id,
            dependencies: self.dependencies,
            recurrence: self.recurrence,
            reminder: self.reminder,
        }
    }
}
