//! Template catalogue port.
//!
//! The catalogue supplies task prototypes to the template creation path.

use thiserror::Error;

use crate::task::domain::TaskPrototype;

/// Result type for template catalogue operations.
pub type TaskTemplateResult<T> = Result<T, TaskTemplateError>;

/// Port for looking up task prototypes by key.
pub trait TaskTemplateCatalog: Send + Sync {
    /// Finds a prototype by template key.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTemplateError::Unavailable`] when catalogue access
    /// fails.
    fn find_by_key(&self, key: &str) -> TaskTemplateResult<Option<TaskPrototype>>;
}

/// Errors for template lookup and rendering.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskTemplateError {
    /// No prototype is registered under the key.
    #[error("unknown task template: {0}")]
    NotFound(String),

    /// A prototype template failed to render.
    #[error("failed to render template '{key}': {reason}")]
    Render {
        /// Template key.
        key: String,
        /// Renderer message.
        reason: String,
    },

    /// General storage or adapter failure.
    #[error("task template catalogue unavailable: {0}")]
    Unavailable(String),
}
