//! Then steps for task lifecycle BDD scenarios.

use std::time::Duration;

use super::world::{TaskLifecycleWorld, run_async};
use eyre::{WrapErr, eyre};
use rstest_bdd_macros::then;
use taskboard::task::{
    domain::{OwnedTask, TaskStatus},
    services::TaskLifecycleError,
};

const MAIL_WAIT: Duration = Duration::from_secs(5);
const MAIL_POLL: Duration = Duration::from_millis(10);

fn last_result(
    world: &TaskLifecycleWorld,
) -> Result<&Result<(), TaskLifecycleError>, eyre::Report> {
    world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre!("no action recorded in scenario world"))
}

#[then("the change succeeds")]
fn change_succeeds(world: &TaskLifecycleWorld) -> Result<(), eyre::Report> {
    match last_result(world)? {
        Ok(()) => Ok(()),
        Err(err) => Err(eyre!("expected success, got {err:?}")),
    }
}

#[then("the change is rejected as unauthorized")]
fn change_unauthorized(world: &TaskLifecycleWorld) -> Result<(), eyre::Report> {
    let result = last_result(world)?;
    if !matches!(result, Err(TaskLifecycleError::Unauthorized)) {
        return Err(eyre!("expected Unauthorized error, got {result:?}"));
    }
    Ok(())
}

#[then("the change fails because the title is taken")]
fn change_title_taken(world: &TaskLifecycleWorld) -> Result<(), eyre::Report> {
    let result = last_result(world)?;
    let Err(TaskLifecycleError::Validation(errors)) = result else {
        return Err(eyre!("expected validation error, got {result:?}"));
    };
    if errors.messages("title") != ["The title has already been taken."] {
        return Err(eyre!("unexpected title errors: {errors:?}"));
    }
    Ok(())
}

#[then(r#"the task "{title}" has status "{status}""#)]
fn task_has_status(
    world: &TaskLifecycleWorld,
    title: String,
    status: String,
) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre!("invalid expected status in scenario: {err}"))?;
    let task_id = world.task_id(&title)?;
    let tasks = run_async(world.tasks.list_all()).wrap_err("list tasks")?;
    let task = tasks
        .iter()
        .map(OwnedTask::task)
        .find(|task| task.id() == task_id)
        .ok_or_else(|| eyre!("task {title} no longer exists"))?;
    if task.status() != expected {
        return Err(eyre!("expected status {expected}, found {}", task.status()));
    }
    Ok(())
}

#[then(r#"the visible task count for "{name}" is {count:usize}"#)]
fn visible_task_count(
    world: &TaskLifecycleWorld,
    name: String,
    count: usize,
) -> Result<(), eyre::Report> {
    let actor = world.actor(&name)?;
    let visible = run_async(world.tasks.list_visible(actor)).wrap_err("list visible tasks")?;
    if visible.len() != count {
        return Err(eyre!(
            "{name} sees {} tasks, expected {count}",
            visible.len()
        ));
    }
    Ok(())
}

#[then(r#""{name}" receives a mail with subject "{subject}""#)]
fn receives_mail(
    world: &mut TaskLifecycleWorld,
    name: String,
    subject: String,
) -> Result<(), eyre::Report> {
    if let Some((dispatcher, events)) = world.pending_dispatcher.take() {
        tokio::spawn(async move { dispatcher.run(events).await });
    }
    let address = format!("{name}@example.com");
    let mailer = world.mailer.clone();
    let delivered = run_async(async move {
        tokio::time::timeout(MAIL_WAIT, async {
            loop {
                let found = mailer
                    .sent()
                    .iter()
                    .any(|mail| mail.to == address && mail.subject == subject);
                if found {
                    break;
                }
                tokio::time::sleep(MAIL_POLL).await;
            }
        })
        .await
    });
    delivered.map_err(|_| eyre!("no mail delivered to {name} in time"))
}
