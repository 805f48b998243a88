//! In-memory template catalogue.

use std::collections::HashMap;

use crate::task::{
    domain::TaskPrototype,
    ports::{TaskTemplateCatalog, TaskTemplateResult},
};

/// Template catalogue backed by a map of prototypes.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTemplateCatalog {
    prototypes: HashMap<String, TaskPrototype>,
}

impl InMemoryTemplateCatalog {
    /// Creates an empty catalogue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a prototype under `key`, replacing any previous one.
    #[must_use]
    pub fn with_template(mut self, key: impl Into<String>, prototype: TaskPrototype) -> Self {
        self.prototypes.insert(key.into(), prototype);
        self
    }
}

impl TaskTemplateCatalog for InMemoryTemplateCatalog {
    fn find_by_key(&self, key: &str) -> TaskTemplateResult<Option<TaskPrototype>> {
        Ok(self.prototypes.get(key).cloned())
    }
}
