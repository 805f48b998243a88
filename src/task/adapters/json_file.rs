//! JSON file snapshot repository.
//!
//! Persists the task snapshot as a JSON array inside a capability-scoped
//! directory. Writes go to a sibling temporary file which is then renamed
//! over the target, so readers never observe a half-written snapshot.
//! Filesystem calls run on the blocking thread pool.

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use std::io;
use std::sync::Arc;

use crate::task::{
    domain::Task,
    ports::{TaskSnapshotError, TaskSnapshotRepository, TaskSnapshotResult},
};

/// Snapshot repository storing tasks in a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileTaskRepository {
    dir: Arc<Dir>,
    file_name: Utf8PathBuf,
}

impl JsonFileTaskRepository {
    /// Creates a repository writing `file_name` inside `dir`.
    #[must_use]
    pub fn new(dir: Dir, file_name: impl Into<Utf8PathBuf>) -> Self {
        Self {
            dir: Arc::new(dir),
            file_name: file_name.into(),
        }
    }

    /// Opens `directory` with ambient authority and stores `file_name` in it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskSnapshotError::Persistence`] when the directory cannot
    /// be opened.
    pub fn open_ambient(
        directory: &Utf8Path,
        file_name: impl Into<Utf8PathBuf>,
    ) -> TaskSnapshotResult<Self> {
        let dir = Dir::open_ambient_dir(directory, ambient_authority())
            .map_err(TaskSnapshotError::persistence)?;
        Ok(Self::new(dir, file_name))
    }

    fn temp_name(&self) -> Utf8PathBuf {
        let mut name = self.file_name.as_str().to_owned();
        name.push_str(".tmp");
        Utf8PathBuf::from(name)
    }
}

async fn run_blocking<F, T>(f: F) -> TaskSnapshotResult<T>
where
    F: FnOnce() -> TaskSnapshotResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|err| TaskSnapshotError::persistence(io::Error::other(err.to_string())))?
}

#[async_trait]
impl TaskSnapshotRepository for JsonFileTaskRepository {
    async fn load(&self) -> TaskSnapshotResult<Vec<Task>> {
        let dir = Arc::clone(&self.dir);
        let file_name = self.file_name.clone();
        run_blocking(move || {
            let contents = match dir.read_to_string(&file_name) {
                Ok(contents) => contents,
                Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
                Err(err) => return Err(TaskSnapshotError::persistence(err)),
            };
            serde_json::from_str(&contents).map_err(TaskSnapshotError::persistence)
        })
        .await
    }

    async fn save(&self, tasks: &[Task]) -> TaskSnapshotResult<()> {
        let encoded = serde_json::to_string_pretty(tasks).map_err(TaskSnapshotError::persistence)?;
        let dir = Arc::clone(&self.dir);
        let file_name = self.file_name.clone();
        let temp_name = self.temp_name();
        run_blocking(move || {
            dir.write(&temp_name, encoded)
                .map_err(TaskSnapshotError::persistence)?;
            dir.rename(&temp_name, &dir, &file_name)
                .map_err(TaskSnapshotError::persistence)
        })
        .await
    }
}
