//! In-memory integration tests for task lifecycle operations.

use chrono::TimeDelta;
use eyre::{OptionExt, ensure};
use rstest::rstest;
use taskwright::task::{
    domain::{
        EntityRef, RecurrencePattern, RecurrenceRule, Task, TaskPatch, TaskPriority, TaskStatus,
        TaskType,
    },
    services::{CreateTaskRequest, SortOrder, TaskFilter, TaskSortKey},
};

use super::helpers::{Harness, at, harness};

fn titles(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(Task::title).collect()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn claim_workflow_runs_from_creation_to_cascade(
    #[future] harness: Harness,
) -> eyre::Result<()> {
    let Harness { manager, repo, .. } = harness.await;
    let claim = manager
        .create_task(
            CreateTaskRequest::new("Process claim C-100", TaskType::ClaimProcessing)
                .with_priority(TaskPriority::High)
                .with_entity(EntityRef::new("claim", "C-100"))
                .with_tags(["motor".to_owned()]),
        )
        .await?;
    let inspect = manager
        .create_task(
            CreateTaskRequest::new("Inspect vehicle", TaskType::Meeting).with_parent(claim.id()),
        )
        .await?;
    let settle = manager
        .create_task(
            CreateTaskRequest::new("Settle payment", TaskType::Document)
                .with_parent(claim.id())
                .with_dependencies([inspect.id()]),
        )
        .await?;

    ensure!(!manager.dependency_status(settle.id())?.can_start);
    manager
        .update_task(inspect.id(), TaskPatch::new().with_status(TaskStatus::InProgress))
        .await?;
    let inspected = manager.complete_task(inspect.id()).await?;
    ensure!(inspected.completed_parent.is_none());
    ensure!(manager.dependency_status(settle.id())?.can_start);

    let settled = manager.complete_task(settle.id()).await?;
    let parent = settled.completed_parent.ok_or_eyre("claim should auto-complete")?;

    ensure!(parent.id() == claim.id());
    ensure!(parent.entity() == Some(&EntityRef::new("claim", "C-100")));
    let persisted = repo.stored()?;
    let stored_claim = persisted
        .iter()
        .find(|task| task.id() == claim.id())
        .ok_or_eyre("claim persisted")?;
    ensure!(stored_claim.status() == TaskStatus::Completed);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn recurring_series_advances_until_cap(#[future] harness: Harness) -> eyre::Result<()> {
    let Harness { manager, .. } = harness.await;
    let rule = RecurrenceRule::new(RecurrencePattern::Monthly, 1)?.with_max_occurrences(2);
    let first = manager
        .create_task(
            CreateTaskRequest::new("Month-end statement", TaskType::Document)
                .with_due_date(at(2024, 1, 31, 17))
                .with_recurrence(rule),
        )
        .await?;

    let second = manager
        .complete_task(first.id())
        .await?
        .next_occurrence
        .ok_or_eyre("second occurrence")?;
    let third = manager
        .complete_task(second.id())
        .await?
        .next_occurrence
        .ok_or_eyre("third occurrence")?;
    let after_cap = manager.complete_task(third.id()).await?;

    ensure!(second.due_date() == Some(at(2024, 2, 29, 17)));
    ensure!(third.due_date() == Some(at(2024, 3, 29, 17)));
    ensure!(third.parent_task_id() == Some(first.id()));
    ensure!(after_cap.next_occurrence.is_none());
    ensure!(manager.list_tasks()?.len() == 3);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn filtered_views_reflect_clock_and_status(#[future] harness: Harness) -> eyre::Result<()> {
    let Harness { manager, clock, .. } = harness.await;
    let now = at(2024, 6, 3, 9);
    for (title, priority, hours) in [
        ("Quote for Acme", TaskPriority::Low, 30),
        ("Callback Jones", TaskPriority::Urgent, 2),
        ("Review policy", TaskPriority::High, 10),
    ] {
        manager
            .create_task(
                CreateTaskRequest::new(title, TaskType::FollowUp)
                    .with_priority(priority)
                    .with_assignee("sam")
                    .with_due_date(now + TimeDelta::hours(hours)),
            )
            .await?;
    }

    let by_priority = manager.get_filtered_tasks(
        &TaskFilter::new().with_assignee("sam"),
        TaskSortKey::Priority,
        SortOrder::Ascending,
    )?;
    ensure!(titles(&by_priority) == ["Callback Jones", "Review policy", "Quote for Acme"]);

    let due_soon = manager.get_filtered_tasks(
        &TaskFilter::new().due_soon_only(),
        TaskSortKey::DueDate,
        SortOrder::Descending,
    )?;
    ensure!(titles(&due_soon) == ["Review policy", "Callback Jones"]);

    clock.advance(TimeDelta::hours(12));
    let overdue = manager.get_filtered_tasks(
        &TaskFilter::new().overdue_only(),
        TaskSortKey::Title,
        SortOrder::Ascending,
    )?;
    ensure!(titles(&overdue) == ["Callback Jones", "Review policy"]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn export_document_is_versioned(#[future] harness: Harness) -> eyre::Result<()> {
    let Harness { manager, .. } = harness.await;
    manager
        .create_task(CreateTaskRequest::new("Exported", TaskType::Email))
        .await?;

    let exported = manager.export_tasks()?;
    let document: serde_json::Value = serde_json::from_str(&exported)?;

    ensure!(document.get("version") == Some(&serde_json::json!(1)));
    ensure!(
        document
            .get("tasks")
            .and_then(serde_json::Value::as_array)
            .map(Vec::len)
            == Some(1)
    );
    Ok(())
}
