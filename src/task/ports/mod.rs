//! Port contracts for task lifecycle management.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod notifier;
pub mod repository;
pub mod template;

pub use notifier::{NotificationError, ReminderNotifier};
pub use repository::{TaskSnapshotError, TaskSnapshotRepository, TaskSnapshotResult};
pub use template::{TaskTemplateCatalog, TaskTemplateError, TaskTemplateResult};
