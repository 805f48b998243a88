//! Given steps for task completion BDD scenarios.

use super::world::{TaskCompletionWorld, morning_of, parse_date, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taskwright::task::{
    domain::{RecurrencePattern, RecurrenceRule, TaskPatch, TaskStatus, TaskType},
    services::{CreateTaskRequest, TaskEngineConfig},
};

#[given("parent auto-completion is disabled")]
fn auto_completion_disabled(world: &mut TaskCompletionWorld) {
    world.reconfigure(TaskEngineConfig::default().with_auto_complete_parent(false));
}

#[given(r#"a parent task "{title}" with {count:u64} subtasks"#)]
fn parent_with_subtasks(
    world: &mut TaskCompletionWorld,
    title: String,
    count: u64,
) -> Result<(), eyre::Report> {
    let parent = run_async(
        world
            .manager
            .create_task(CreateTaskRequest::new(title, TaskType::Custom)),
    )
    .wrap_err("create parent")?;
    for index in 1..=count {
        let request = CreateTaskRequest::new(format!("Subtask {index}"), TaskType::Call)
            .with_parent(parent.id());
        let child = run_async(world.manager.create_task(request)).wrap_err("create subtask")?;
        world.subtasks.push(child.id());
    }
    world.parent = Some(parent);
    Ok(())
}

#[given(r#"a task "{title}" repeating every {interval:u32} weeks due on "{due}""#)]
fn recurring_weekly_task(
    world: &mut TaskCompletionWorld,
    title: String,
    interval: u32,
    due: String,
) -> Result<(), eyre::Report> {
    let rule = RecurrenceRule::new(RecurrencePattern::Weekly, interval)?;
    let request = CreateTaskRequest::new(title, TaskType::Meeting)
        .with_due_date(morning_of(parse_date(&due)?)?)
        .with_recurrence(rule);
    let task = run_async(world.manager.create_task(request)).wrap_err("create recurring task")?;
    world.current = Some(task);
    Ok(())
}

#[given("the task has been cancelled")]
fn task_cancelled(world: &mut TaskCompletionWorld) -> Result<(), eyre::Report> {
    let task_id = world.current_task()?.id();
    let cancelled = run_async(
        world
            .manager
            .update_task(task_id, TaskPatch::new().with_status(TaskStatus::Cancelled)),
    )
    .wrap_err("cancel task")?;
    world.current = Some(cancelled);
    Ok(())
}
