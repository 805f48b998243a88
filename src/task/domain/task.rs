//! Task aggregate root.

use super::{
    ChecklistItem, ChecklistItemId, ChecklistItemUpdate, RecurrenceRule, ReminderSettings,
    TaskDomainError, TaskId, TaskPatch, TaskPriority, TaskStatus, TaskType, checklist_progress,
};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Non-owning reference to an external business record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    /// Kind of record, e.g. `lead` or `claim`.
    pub entity_type: String,
    /// Identifier of the record in its owning system.
    pub entity_id: String,
}

impl EntityRef {
    /// Creates an entity reference.
    #[must_use]
    pub fn new(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
        }
    }
}

/// Validated-on-create input for a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    /// Task title; must be non-empty after trimming.
    pub title: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Kind of work.
    pub task_type: TaskType,
    /// Urgency.
    pub priority: TaskPriority,
    /// Due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Estimated effort in minutes.
    pub estimated_duration_minutes: u32,
    /// Assignee.
    pub assigned_to: Option<String>,
    /// Initial checklist.
    pub checklist: Vec<ChecklistItem>,
    /// Tags.
    pub tags: BTreeSet<String>,
    /// Linked business record.
    pub entity: Option<EntityRef>,
    /// Parent task.
    pub parent_task_id: Option<TaskId>,
    /// Tasks that must complete first.
    pub dependencies: Vec<TaskId>,
    /// Recurrence rule; its presence marks the task recurring.
    pub recurrence: Option<RecurrenceRule>,
    /// Reminder settings.
    pub reminder: Option<ReminderSettings>,
}

/// What a patch did to the task's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct PatchOutcome {
    /// The task entered [`TaskStatus::Completed`] during this patch.
    pub completed: bool,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: String,
    #[serde(default)]
    description: Option<String>,
    task_type: TaskType,
    priority: TaskPriority,
    status: TaskStatus,
    #[serde(default)]
    due_date: Option<DateTime<Utc>>,
    estimated_duration_minutes: u32,
    #[serde(default)]
    assigned_to: Option<String>,
    #[serde(default)]
    checklist: Vec<ChecklistItem>,
    #[serde(default)]
    tags: BTreeSet<String>,
    #[serde(default)]
    entity: Option<EntityRef>,
    #[serde(default)]
    parent_task_id: Option<TaskId>,
    #[serde(default)]
    dependencies: Vec<TaskId>,
    #[serde(default)]
    recurring: bool,
    #[serde(default)]
    recurrence: Option<RecurrenceRule>,
    #[serde(default)]
    reminder: Option<ReminderSettings>,
    #[serde(default)]
    reminder_sent: bool,
    progress: u8,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a new task from a draft.
    ///
    /// The task starts `todo`, or `completed` when the draft carries a
    /// non-empty checklist with every item ticked.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the title is blank.
    pub fn create(draft: TaskDraft, now: DateTime<Utc>) -> Result<Self, TaskDomainError> {
        let title = normalized_title(&draft.title)?;
        let id = TaskId::new();
        let progress = checklist_progress(&draft.checklist);
        let (status, completed_at) = if is_finished_checklist(&draft.checklist) {
            (TaskStatus::Completed, Some(now))
        } else {
            (TaskStatus::Todo, None)
        };

        Ok(Self {
            id,
            title,
            description: draft.description,
            task_type: draft.task_type,
            priority: draft.priority,
            status,
            due_date: draft.due_date,
            estimated_duration_minutes: draft.estimated_duration_minutes,
            assigned_to: draft.assigned_to,
            checklist: draft.checklist,
            tags: draft.tags,
            entity: draft.entity,
            parent_task_id: draft.parent_task_id,
            dependencies: dedup_ids(draft.dependencies),
            recurring: draft.recurrence.is_some(),
            recurrence: draft.recurrence,
            reminder: draft.reminder,
            reminder_sent: false,
            progress,
            created_at: now,
            updated_at: now,
            completed_at,
        })
    }

    /// Checks a task built outside [`Self::create`], such as one decoded
    /// from an export document.
    ///
    /// # Errors
    ///
    /// Returns the [`TaskDomainError`] for the first rule the task breaks.
    pub fn validate(&self) -> Result<(), TaskDomainError> {
        normalized_title(&self.title)?;
        if self.parent_task_id == Some(self.id) {
            return Err(TaskDomainError::SelfParent(self.id));
        }
        if self.dependencies.contains(&self.id) {
            return Err(TaskDomainError::SelfDependency(self.id));
        }
        if let Some(rule) = &self.recurrence {
            if rule.interval() == 0 {
                return Err(TaskDomainError::InvalidRecurrenceInterval(0));
            }
            if let Some(day) = rule.days_of_week().iter().copied().find(|day| *day > 6) {
                return Err(TaskDomainError::InvalidWeekday(day));
            }
        }
        if self.checklist.iter().any(|item| item.text().trim().is_empty()) {
            return Err(TaskDomainError::EmptyChecklistText);
        }
        if let Some(reason) = self.progress_violation() {
            return Err(TaskDomainError::InconsistentTask {
                task_id: self.id,
                reason,
            });
        }
        Ok(())
    }

    fn progress_violation(&self) -> Option<&'static str> {
        if self.progress > 100 {
            return Some("progress above 100");
        }
        if self.status == TaskStatus::Completed {
            if self.progress != 100 {
                return Some("completed task below full progress");
            }
            if self.completed_at.is_none() {
                return Some("completed task without a completion time");
            }
            return None;
        }
        if !self.checklist.is_empty() && self.progress != checklist_progress(&self.checklist) {
            return Some("progress does not match the checklist");
        }
        if is_finished_checklist(&self.checklist) && !self.status.is_terminal() {
            return Some("open task with a fully ticked checklist");
        }
        None
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the task type.
    #[must_use]
    pub const fn task_type(&self) -> TaskType {
        self.task_type
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Returns the estimated effort in minutes.
    #[must_use]
    pub const fn estimated_duration_minutes(&self) -> u32 {
        self.estimated_duration_minutes
    }

    /// Returns the assignee, if any.
    #[must_use]
    pub fn assigned_to(&self) -> Option<&str> {
        self.assigned_to.as_deref()
    }

    /// Returns the checklist in display order.
    #[must_use]
    pub fn checklist(&self) -> &[ChecklistItem] {
        &self.checklist
    }

    /// Returns the tags.
    #[must_use]
    pub const fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Returns the linked business record, if any.
    #[must_use]
    pub const fn entity(&self) -> Option<&EntityRef> {
        self.entity.as_ref()
    }

    /// Returns the parent task, if any.
    #[must_use]
    pub const fn parent_task_id(&self) -> Option<TaskId> {
        self.parent_task_id
    }

    /// Returns the declared dependencies in insertion order.
    #[must_use]
    pub fn dependencies(&self) -> &[TaskId] {
        &self.dependencies
    }

    /// Returns whether the task repeats on completion.
    #[must_use]
    pub const fn is_recurring(&self) -> bool {
        self.recurring
    }

    /// Returns the recurrence rule, if any.
    #[must_use]
    pub const fn recurrence(&self) -> Option<&RecurrenceRule> {
        self.recurrence.as_ref()
    }

    /// Returns the reminder settings, if any.
    #[must_use]
    pub const fn reminder(&self) -> Option<ReminderSettings> {
        self.reminder
    }

    /// Returns whether the reminder for the current due date has fired.
    #[must_use]
    pub const fn reminder_sent(&self) -> bool {
        self.reminder_sent
    }

    /// Returns progress in percent.
    #[must_use]
    pub const fn progress(&self) -> u8 {
        self.progress
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the completion timestamp, if completed.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns `true` when the task is past due and still open.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.status.is_terminal() && self.due_date.is_some_and(|due| due < now)
    }

    /// Returns `true` when the task is open and due within `window` of `now`.
    #[must_use]
    pub fn is_due_within(&self, now: DateTime<Utc>, window: TimeDelta) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        let horizon = now.checked_add_signed(window).unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.due_date.is_some_and(|due| due >= now && due <= horizon)
    }

    /// Returns the instant the reminder becomes due.
    ///
    /// `None` when the task has no due date or no reminder configured.
    #[must_use]
    pub fn reminder_time(&self) -> Option<DateTime<Utc>> {
        let reminder = self.reminder?;
        self.due_date.map(|due| reminder.fire_at(due))
    }

    /// Returns `true` when the reminder should fire at `now`.
    #[must_use]
    pub fn should_fire_reminder(&self, now: DateTime<Utc>) -> bool {
        let enabled = self.reminder.is_some_and(ReminderSettings::is_enabled);
        enabled
            && !self.status.is_terminal()
            && !self.reminder_sent
            && self.reminder_time().is_some_and(|at| now >= at)
    }

    /// Records that the reminder fired for the current due date.
    pub(crate) fn mark_reminder_sent(&mut self) {
        self.reminder_sent = true;
    }

    /// Applies a patch, validating it in full before any field changes.
    ///
    /// A checklist in the patch recomputes progress; a complete non-empty
    /// checklist moves an open task to [`TaskStatus::Completed`]. A changed
    /// due date re-arms the reminder.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] for a blank title, an invalid status
    /// transition, or a self-referencing parent or dependency.
    pub fn apply_patch(
        &mut self,
        mut patch: TaskPatch,
        now: DateTime<Utc>,
    ) -> Result<PatchOutcome, TaskDomainError> {
        let title = patch.title.as_deref().map(normalized_title).transpose()?;
        if let Some(target) = patch.status {
            self.ensure_transition(target)?;
        }
        if patch.parent_task_id == Some(Some(self.id)) {
            return Err(TaskDomainError::SelfParent(self.id));
        }
        if patch
            .dependencies
            .as_ref()
            .is_some_and(|deps| deps.contains(&self.id))
        {
            return Err(TaskDomainError::SelfDependency(self.id));
        }

        let was_completed = self.status == TaskStatus::Completed;
        let status = patch.status.take();
        let due_date = patch.due_date.take();
        let checklist = patch.checklist.take();
        self.merge_fields(patch, title);

        if let Some(target) = status {
            self.status = target;
        }
        if let Some(new_due_date) = due_date {
            if new_due_date != self.due_date {
                self.due_date = new_due_date;
                self.reminder_sent = false;
            }
        }
        if let Some(new_checklist) = checklist {
            self.checklist = new_checklist;
            self.progress = checklist_progress(&self.checklist);
            if is_finished_checklist(&self.checklist) && !self.status.is_terminal() {
                self.status = TaskStatus::Completed;
            }
        }

        let completed = !was_completed && self.status == TaskStatus::Completed;
        if completed {
            self.completed_at = Some(now);
        }
        if self.status == TaskStatus::Completed {
            self.progress = 100;
        }
        self.updated_at = now;
        Ok(PatchOutcome { completed })
    }

    fn merge_fields(&mut self, patch: TaskPatch, title: Option<String>) {
        if let Some(value) = title {
            self.title = value;
        }
        if let Some(value) = patch.description {
            self.description = value;
        }
        if let Some(value) = patch.task_type {
            self.task_type = value;
        }
        if let Some(value) = patch.priority {
            self.priority = value;
        }
        if let Some(value) = patch.estimated_duration_minutes {
            self.estimated_duration_minutes = value;
        }
        if let Some(value) = patch.assigned_to {
            self.assigned_to = value;
        }
        if let Some(value) = patch.tags {
            self.tags = value;
        }
        if let Some(value) = patch.entity {
            self.entity = value;
        }
        if let Some(value) = patch.parent_task_id {
            self.parent_task_id = value;
        }
        if let Some(value) = patch.dependencies {
            self.dependencies = dedup_ids(value);
        }
        if let Some(value) = patch.recurring {
            self.recurring = value;
        }
        if let Some(value) = patch.recurrence {
            self.recurrence = value;
        }
        if let Some(value) = patch.reminder {
            self.reminder = value;
        }
    }

    /// Completes the task.
    ///
    /// Returns `Ok(false)` without changes when the task is already
    /// completed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] for a cancelled
    /// task.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<bool, TaskDomainError> {
        if self.status == TaskStatus::Completed {
            return Ok(false);
        }
        self.ensure_transition(TaskStatus::Completed)?;
        self.status = TaskStatus::Completed;
        self.completed_at = Some(now);
        self.progress = 100;
        self.updated_at = now;
        Ok(true)
    }

    fn ensure_transition(&self, target: TaskStatus) -> Result<(), TaskDomainError> {
        if self.status == target || self.status.can_transition_to(target) {
            return Ok(());
        }
        Err(TaskDomainError::InvalidStateTransition {
            task_id: self.id,
            from: self.status,
            to: target,
        })
    }

    /// Returns the checklist with `item` appended.
    #[must_use]
    pub fn checklist_with_added(&self, item: ChecklistItem) -> Vec<ChecklistItem> {
        let mut checklist = self.checklist.clone();
        checklist.push(item);
        checklist
    }

    /// Returns the checklist without the given item.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::ChecklistItemNotFound`] when the item is
    /// not on this task.
    pub fn checklist_without(
        &self,
        item_id: ChecklistItemId,
    ) -> Result<Vec<ChecklistItem>, TaskDomainError> {
        let original_len = self.checklist.len();
        let checklist: Vec<ChecklistItem> = self
            .checklist
            .iter()
            .filter(|item| item.id() != item_id)
            .cloned()
            .collect();
        if checklist.len() == original_len {
            return Err(self.missing_item(item_id));
        }
        Ok(checklist)
    }

    /// Returns the checklist with one item updated.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::ChecklistItemNotFound`] when the item is
    /// not on this task, or [`TaskDomainError::EmptyChecklistText`] for
    /// blank replacement text.
    pub fn checklist_with_update(
        &self,
        item_id: ChecklistItemId,
        update: ChecklistItemUpdate,
    ) -> Result<Vec<ChecklistItem>, TaskDomainError> {
        let mut checklist = self.checklist.clone();
        let item = checklist
            .iter_mut()
            .find(|item| item.id() == item_id)
            .ok_or_else(|| self.missing_item(item_id))?;
        if let Some(text) = update.text {
            item.set_text(text)?;
        }
        if let Some(completed) = update.completed {
            item.set_completed(completed);
        }
        Ok(checklist)
    }

    const fn missing_item(&self, item_id: ChecklistItemId) -> TaskDomainError {
        TaskDomainError::ChecklistItemNotFound {
            task_id: self.id,
            item_id,
        }
    }

    /// Adds a dependency. Returns `false` when it was already declared.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::SelfDependency`] when `dependency` is this
    /// task.
    pub fn add_dependency(
        &mut self,
        dependency: TaskId,
        now: DateTime<Utc>,
    ) -> Result<bool, TaskDomainError> {
        if dependency == self.id {
            return Err(TaskDomainError::SelfDependency(self.id));
        }
        if self.dependencies.contains(&dependency) {
            return Ok(false);
        }
        self.dependencies.push(dependency);
        self.updated_at = now;
        Ok(true)
    }

    /// Removes a dependency. Returns `false` when it was not declared.
    pub fn remove_dependency(&mut self, dependency: TaskId, now: DateTime<Utc>) -> bool {
        let original_len = self.dependencies.len();
        self.dependencies.retain(|id| *id != dependency);
        let removed = self.dependencies.len() != original_len;
        if removed {
            self.updated_at = now;
        }
        removed
    }

    /// Builds the next instance of a recurring series.
    ///
    /// The instance is a fresh `todo` copy due at `due_date`, linked to the
    /// series root and carrying the advanced occurrence counter.
    pub(crate) fn next_instance(&self, due_date: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let checklist = self
            .checklist
            .iter()
            .cloned()
            .map(|item| item.with_completed(false))
            .collect();

        Self {
            id: TaskId::new(),
            status: TaskStatus::Todo,
            due_date: Some(due_date),
            checklist,
            parent_task_id: Some(self.parent_task_id.unwrap_or(self.id)),
            recurrence: self.recurrence.as_ref().map(RecurrenceRule::advanced),
            reminder_sent: false,
            progress: 0,
            created_at: now,
            updated_at: now,
            completed_at: None,
            ..self.clone()
        }
    }
}

fn normalized_title(title: &str) -> Result<String, TaskDomainError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TaskDomainError::EmptyTitle);
    }
    Ok(trimmed.to_owned())
}

fn is_finished_checklist(checklist: &[ChecklistItem]) -> bool {
    !checklist.is_empty() && checklist_progress(checklist) == 100
}

fn dedup_ids(ids: Vec<TaskId>) -> Vec<TaskId> {
    let mut seen = BTreeSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
