//! Then steps for task completion BDD scenarios.

use super::world::{TaskCompletionWorld, parse_date};
use eyre::{OptionExt, bail, ensure, eyre};
use rstest_bdd_macros::then;
use taskwright::task::{
    domain::{Task, TaskDomainError, TaskStatus},
    services::TaskLifecycleError,
};

fn next_occurrence(world: &TaskCompletionWorld) -> Result<&Task, eyre::Report> {
    match world.completion()? {
        Ok(completion) => completion
            .next_occurrence
            .as_ref()
            .ok_or_eyre("no occurrence spawned"),
        Err(err) => Err(eyre!("completion failed: {err}")),
    }
}

#[then(r#"the parent task status is "{status}""#)]
fn parent_status(world: &TaskCompletionWorld, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str()).map_err(|err| eyre!("{err}"))?;
    let parent_id = world.parent.as_ref().ok_or_eyre("no parent task")?.id();
    let stored = world
        .manager
        .get_task(parent_id)?
        .ok_or_eyre("parent task missing")?;
    ensure!(
        stored.status() == expected,
        "expected parent {expected}, found {}",
        stored.status()
    );
    Ok(())
}

#[then(r#"a new occurrence is due on "{due}""#)]
fn occurrence_due_on(world: &TaskCompletionWorld, due: String) -> Result<(), eyre::Report> {
    let expected = parse_date(&due)?;
    let next = next_occurrence(world)?;
    let series = world.current_task()?;
    ensure!(next.id() != series.id(), "occurrence reused the series id");
    ensure!(
        next.due_date().map(|date| date.date_naive()) == Some(expected),
        "unexpected due date {:?}",
        next.due_date()
    );
    Ok(())
}

#[then(r#"the new occurrence status is "{status}""#)]
fn occurrence_status(world: &TaskCompletionWorld, status: String) -> Result<(), eyre::Report> {
    let next = next_occurrence(world)?;
    ensure!(next.status().as_str() == status, "found {}", next.status());
    Ok(())
}

#[then("the completion fails with an invalid state transition error")]
fn completion_rejected(world: &TaskCompletionWorld) -> Result<(), eyre::Report> {
    match world.completion()? {
        Err(TaskLifecycleError::Validation(TaskDomainError::InvalidStateTransition {
            from: TaskStatus::Cancelled,
            to: TaskStatus::Completed,
            ..
        })) => Ok(()),
        other => bail!("expected invalid state transition, got {other:?}"),
    }
}

#[then("no new occurrence is created")]
fn no_new_occurrence(world: &TaskCompletionWorld) -> Result<(), eyre::Report> {
    let count = world.manager.list_tasks()?.len();
    ensure!(
        count == world.task_count_before,
        "task count changed from {} to {count}",
        world.task_count_before
    );
    Ok(())
}
