//! When steps for task completion BDD scenarios.

use super::world::{TaskCompletionWorld, run_async};
use eyre::{OptionExt, WrapErr};
use rstest_bdd_macros::when;

#[when("subtask {index:u64} is completed")]
fn complete_subtask(world: &mut TaskCompletionWorld, index: u64) -> Result<(), eyre::Report> {
    let position = usize::try_from(index)?
        .checked_sub(1)
        .ok_or_eyre("subtasks are numbered from 1")?;
    let subtask = *world
        .subtasks
        .get(position)
        .ok_or_eyre("no such subtask")?;
    let completion = run_async(world.manager.complete_task(subtask)).wrap_err("complete subtask")?;
    world.last_completion = Some(Ok(completion));
    Ok(())
}

#[when("the task is completed")]
fn complete_current_task(world: &mut TaskCompletionWorld) -> Result<(), eyre::Report> {
    let task_id = world.current_task()?.id();
    world.task_count_before = world.manager.list_tasks()?.len();
    let result = run_async(world.manager.complete_task(task_id));
    world.last_completion = Some(result);
    Ok(())
}
