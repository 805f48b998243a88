//! Versioned JSON export and import of the task list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::task::domain::{Task, TaskDomainError};

/// Export document version written by this crate.
pub const EXPORT_FORMAT_VERSION: u32 = 1;

/// Errors raised while encoding or decoding an export document.
#[derive(Debug, Error)]
pub enum TaskTransferError {
    /// The document is not valid JSON or does not match the schema.
    #[error("invalid task export document: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The document was written by an unsupported format version.
    #[error("unsupported task export version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version found in the document.
        found: u32,
        /// Version this crate reads.
        expected: u32,
    },

    /// A task in the document breaks the task model.
    #[error("invalid task in export document: {0}")]
    InvalidTask(#[from] TaskDomainError),
}

/// Portable snapshot of every task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskExport {
    /// Document format version.
    pub version: u32,
    /// When the document was produced.
    pub exported_at: DateTime<Utc>,
    /// Tasks in store order.
    pub tasks: Vec<Task>,
}

impl TaskExport {
    /// Wraps `tasks` in a current-version document.
    #[must_use]
    pub const fn new(tasks: Vec<Task>, exported_at: DateTime<Utc>) -> Self {
        Self {
            version: EXPORT_FORMAT_VERSION,
            exported_at,
            tasks,
        }
    }

    /// Encodes the document as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTransferError::Malformed`] when serialisation fails.
    pub fn to_json(&self) -> Result<String, TaskTransferError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decodes, version-checks and validates a document.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTransferError::Malformed`] for invalid JSON,
    /// [`TaskTransferError::UnsupportedVersion`] for other versions and
    /// [`TaskTransferError::InvalidTask`] for a task that breaks the model.
    pub fn from_json(raw: &str) -> Result<Self, TaskTransferError> {
        let document: Self = serde_json::from_str(raw)?;
        if document.version != EXPORT_FORMAT_VERSION {
            return Err(TaskTransferError::UnsupportedVersion {
                found: document.version,
                expected: EXPORT_FORMAT_VERSION,
            });
        }
        for task in &document.tasks {
            task.validate()?;
        }
        Ok(document)
    }
}
