//! In-memory adapters for task lifecycle tests and embedding.

mod notifier;
mod snapshot;
mod template;

pub use notifier::RecordingNotifier;
pub use snapshot::InMemoryTaskSnapshotRepository;
pub use template::InMemoryTemplateCatalog;
