//! Integration tests for the reminder sweep.

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use eyre::ensure;
use rstest::rstest;
use taskwright::task::{
    adapters::memory::RecordingNotifier,
    domain::{ReminderSettings, TaskPatch, TaskType},
    services::CreateTaskRequest,
};
use tokio_util::sync::CancellationToken;

use super::helpers::{Harness, at, harness};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rescheduled_task_is_reminded_again(#[future] harness: Harness) -> eyre::Result<()> {
    let Harness { manager, repo, clock } = harness.await;
    let due = at(2024, 6, 3, 10);
    let task = manager
        .create_task(
            CreateTaskRequest::new("Renewal call", TaskType::Call)
                .with_due_date(due)
                .with_reminder(ReminderSettings::before(60)),
        )
        .await?;
    let notifier = Arc::new(RecordingNotifier::new());
    let scheduler = manager.reminder_scheduler(Arc::clone(&notifier));

    let first = scheduler.sweep().await?;
    let repeat = scheduler.sweep().await?;
    ensure!(first.fired == vec![task.id()]);
    ensure!(repeat.is_empty());
    ensure!(repo.stored()?.iter().all(|stored| stored.reminder_sent()));

    manager
        .update_task(task.id(), TaskPatch::new().with_due_date(Some(due + TimeDelta::days(1))))
        .await?;
    let before_new_window = scheduler.sweep().await?;
    clock.advance(TimeDelta::days(1));
    let after_reschedule = scheduler.sweep().await?;

    ensure!(before_new_window.is_empty());
    ensure!(after_reschedule.fired == vec![task.id()]);
    ensure!(notifier.notified() == vec![task.id(), task.id()]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completed_tasks_are_not_reminded(#[future] harness: Harness) -> eyre::Result<()> {
    let Harness { manager, .. } = harness.await;
    let task = manager
        .create_task(
            CreateTaskRequest::new("Closed before reminder", TaskType::Email)
                .with_due_date(at(2024, 6, 3, 9))
                .with_reminder(ReminderSettings::before(15)),
        )
        .await?;
    manager.complete_task(task.id()).await?;
    let notifier = Arc::new(RecordingNotifier::new());

    let report = manager.reminder_scheduler(Arc::clone(&notifier)).sweep().await?;

    ensure!(report.is_empty());
    ensure!(notifier.notified().is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn background_job_fires_and_shuts_down(#[future] harness: Harness) -> eyre::Result<()> {
    let Harness { manager, .. } = harness.await;
    let task = manager
        .create_task(
            CreateTaskRequest::new("Background reminder", TaskType::FollowUp)
                .with_due_date(at(2024, 6, 3, 9))
                .with_reminder(ReminderSettings::before(0)),
        )
        .await?;
    let notifier = Arc::new(RecordingNotifier::new());
    let scheduler = Arc::new(manager.reminder_scheduler(Arc::clone(&notifier)));
    let cancel = CancellationToken::new();

    let job = scheduler.spawn(Duration::from_millis(20), cancel.clone());
    for _ in 0..50 {
        if !notifier.notified().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    cancel.cancel();
    job.shutdown().await?;

    ensure!(notifier.notified() == vec![task.id()]);
    Ok(())
}
