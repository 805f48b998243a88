//! Integration tests for the JSON file snapshot repository.

use std::sync::Arc;

use camino::Utf8Path;
use eyre::{OptionExt, ensure};
use taskwright::task::{
    adapters::json_file::JsonFileTaskRepository,
    domain::{TaskStatus, TaskType},
    services::{CreateTaskRequest, TaskEngineConfig, TaskLifecycleManager},
};

use super::helpers::{StepClock, at};

async fn open_manager(
    dir: &Utf8Path,
) -> eyre::Result<TaskLifecycleManager<JsonFileTaskRepository, StepClock>> {
    let repo = Arc::new(JsonFileTaskRepository::open_ambient(dir, "tasks.json")?);
    let clock = Arc::new(StepClock::new(at(2024, 6, 3, 9)));
    Ok(TaskLifecycleManager::open(repo, clock, TaskEngineConfig::default()).await?)
}

#[tokio::test(flavor = "multi_thread")]
async fn tasks_survive_a_restart() -> eyre::Result<()> {
    let temp = tempfile::tempdir()?;
    let dir = Utf8Path::from_path(temp.path()).ok_or_eyre("utf-8 temp dir")?;

    let (parent_id, child_id) = {
        let manager = open_manager(dir).await?;
        let parent = manager
            .create_task(CreateTaskRequest::new("Annual review", TaskType::PolicyReview))
            .await?;
        let child = manager
            .create_task(
                CreateTaskRequest::new("Gather statements", TaskType::Document)
                    .with_parent(parent.id()),
            )
            .await?;
        manager.complete_task(child.id()).await?;
        manager.close().await?;
        (parent.id(), child.id())
    };

    let reopened = open_manager(dir).await?;
    let parent = reopened.get_task(parent_id)?.ok_or_eyre("parent reloaded")?;
    let subtasks = reopened.subtasks_of(parent_id)?;

    ensure!(parent.status() == TaskStatus::Completed);
    ensure!(subtasks.iter().map(|task| task.id()).collect::<Vec<_>>() == vec![child_id]);
    Ok(())
}
