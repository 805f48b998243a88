//! World state for task completion BDD scenarios.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use eyre::{OptionExt, eyre};
use mockable::DefaultClock;
use rstest::fixture;
use taskwright::task::{
    adapters::memory::InMemoryTaskSnapshotRepository,
    domain::{Task, TaskId},
    services::{
        TaskCompletion, TaskEngineConfig, TaskLifecycleError, TaskLifecycleManager, TaskStore,
    },
};

pub type TestManager = TaskLifecycleManager<InMemoryTaskSnapshotRepository, DefaultClock>;

/// World state for task completion BDD tests.
pub struct TaskCompletionWorld {
    pub manager: TestManager,
    pub parent: Option<Task>,
    pub subtasks: Vec<TaskId>,
    pub current: Option<Task>,
    pub task_count_before: usize,
    pub last_completion: Option<Result<TaskCompletion, TaskLifecycleError>>,
}

impl TaskCompletionWorld {
    /// Replaces the manager with a fresh one using `config`.
    pub fn reconfigure(&mut self, config: TaskEngineConfig) {
        self.manager = build_manager(config);
    }

    pub fn current_task(&self) -> Result<&Task, eyre::Report> {
        self.current.as_ref().ok_or_eyre("no current task")
    }

    pub fn completion(&self) -> Result<&Result<TaskCompletion, TaskLifecycleError>, eyre::Report> {
        self.last_completion
            .as_ref()
            .ok_or_eyre("no completion attempted")
    }
}

impl Default for TaskCompletionWorld {
    fn default() -> Self {
        Self {
            manager: build_manager(TaskEngineConfig::default()),
            parent: None,
            subtasks: Vec::new(),
            current: None,
            task_count_before: 0,
            last_completion: None,
        }
    }
}

fn build_manager(config: TaskEngineConfig) -> TestManager {
    let store = TaskStore::empty(
        Arc::new(InMemoryTaskSnapshotRepository::new()),
        config.collaborator_timeout(),
    );
    TaskLifecycleManager::new(Arc::new(store), Arc::new(DefaultClock), config)
}

#[fixture]
pub fn world() -> TaskCompletionWorld {
    TaskCompletionWorld::default()
}

pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Parses a `YYYY-MM-DD` scenario date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, eyre::Report> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|err| eyre!("bad date {raw}: {err}"))
}

/// Scenario dates fall at 09:00 UTC.
pub fn morning_of(date: NaiveDate) -> Result<DateTime<Utc>, eyre::Report> {
    date.and_hms_opt(9, 0, 0)
        .map(|naive| naive.and_utc())
        .ok_or_eyre("invalid time of day")
}
