//! Checklist items and checklist-driven progress.

use super::{ChecklistItemId, TaskDomainError};
use serde::{Deserialize, Serialize};

/// A single checklist entry on a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    id: ChecklistItemId,
    text: String,
    completed: bool,
}

impl ChecklistItem {
    /// Creates an uncompleted checklist item.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyChecklistText`] when the text is
    /// empty after trimming.
    pub fn new(text: impl Into<String>) -> Result<Self, TaskDomainError> {
        Ok(Self {
            id: ChecklistItemId::new(),
            text: normalized_text(text.into())?,
            completed: false,
        })
    }

    /// Returns the item identifier.
    #[must_use]
    pub const fn id(&self) -> ChecklistItemId {
        self.id
    }

    /// Returns the item text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns whether the item is ticked off.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.completed
    }

    /// Returns the item with its completion flag set.
    #[must_use]
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    pub(crate) fn set_text(&mut self, text: String) -> Result<(), TaskDomainError> {
        self.text = normalized_text(text)?;
        Ok(())
    }

    pub(crate) fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }
}

fn normalized_text(text: String) -> Result<String, TaskDomainError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(TaskDomainError::EmptyChecklistText);
    }
    Ok(trimmed.to_owned())
}

/// Computes task progress from its checklist.
///
/// Returns the percentage of completed items rounded half-up, or `0` for an
/// empty checklist.
#[must_use]
pub fn checklist_progress(checklist: &[ChecklistItem]) -> u8 {
    let total = checklist.len();
    let completed = checklist.iter().filter(|item| item.completed).count();
    let rounded = (completed * 200 + total)
        .checked_div(total * 2)
        .unwrap_or(0);
    u8::try_from(rounded.min(100)).unwrap_or(100)
}
