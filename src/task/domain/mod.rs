//! Domain model for task lifecycle management.
//!
//! The task domain models the task aggregate, its status machine,
//! checklist-driven progress, recurrence arithmetic and reminder timing while
//! keeping all infrastructure concerns outside of the domain boundary.

mod checklist;
mod error;
mod ids;
mod kind;
mod patch;
mod prototype;
mod recurrence;
mod reminder;
mod status;
mod task;

pub use checklist::{ChecklistItem, checklist_progress};
pub use error::{ParseTaskFieldError, TaskDomainError};
pub use ids::{ChecklistItemId, TaskId};
pub use kind::{TaskPriority, TaskType};
pub use patch::{ChecklistItemUpdate, TaskPatch};
pub use prototype::TaskPrototype;
pub use recurrence::{RecurrencePattern, RecurrenceRule, next_occurrence};
pub use reminder::ReminderSettings;
pub use status::TaskStatus;
pub use task::{EntityRef, PatchOutcome, Task, TaskDraft};
