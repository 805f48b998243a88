//! Reusable task prototypes served by a template catalogue.

use super::{ReminderSettings, TaskPriority, TaskType};
use serde::{Deserialize, Serialize};

/// Blueprint for creating a task from a named template.
///
/// Title and description are `minijinja` templates rendered against a
/// caller-supplied context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPrototype {
    /// Template rendering the task title.
    pub title_template: String,
    /// Template rendering the task description.
    #[serde(default)]
    pub description_template: Option<String>,
    /// Kind of work.
    pub task_type: TaskType,
    /// Urgency.
    #[serde(default)]
    pub priority: TaskPriority,
    /// Estimated effort; the engine default applies when absent.
    #[serde(default)]
    pub estimated_duration_minutes: Option<u32>,
    /// Checklist item texts.
    #[serde(default)]
    pub checklist: Vec<String>,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Reminder settings.
    #[serde(default)]
    pub reminder: Option<ReminderSettings>,
}

impl TaskPrototype {
    /// Creates a prototype with the given title template.
    #[must_use]
    pub fn new(title_template: impl Into<String>, task_type: TaskType) -> Self {
        Self {
            title_template: title_template.into(),
            description_template: None,
            task_type,
            priority: TaskPriority::default(),
            estimated_duration_minutes: None,
            checklist: Vec::new(),
            tags: Vec::new(),
            reminder: None,
        }
    }

    /// Sets the description template.
    #[must_use]
    pub fn with_description_template(mut self, template: impl Into<String>) -> Self {
        self.description_template = Some(template.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the estimated duration.
    #[must_use]
    pub const fn with_estimated_duration(mut self, minutes: u32) -> Self {
        self.estimated_duration_minutes = Some(minutes);
        self
    }

    /// Sets the checklist item texts.
    #[must_use]
    pub fn with_checklist(mut self, items: impl IntoIterator<Item = String>) -> Self {
        self.checklist = items.into_iter().collect();
        self
    }

    /// Sets the tags.
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    /// Sets the reminder.
    #[must_use]
    pub const fn with_reminder(mut self, reminder: ReminderSettings) -> Self {
        self.reminder = Some(reminder);
        self
    }
}
