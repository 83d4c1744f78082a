//! Given steps for task lifecycle BDD scenarios.

use super::world::{TaskLifecycleWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taskboard::{
    identity::{domain::Role, services::RegisterUserRequest},
    task::services::CreateTaskRequest,
};

fn register(world: &mut TaskLifecycleWorld, name: String, role: Role) -> Result<(), eyre::Report> {
    let request = RegisterUserRequest::new(
        name.clone(),
        format!("{name}@example.com"),
        "password123",
    )
    .with_role(role);
    let user = run_async(world.auth.register(request)).wrap_err("register scenario user")?;
    world.actors.insert(name, user.actor());
    Ok(())
}

#[given(r#"a standard user "{name}""#)]
fn standard_user(world: &mut TaskLifecycleWorld, name: String) -> Result<(), eyre::Report> {
    register(world, name, Role::Standard)
}

#[given(r#"an admin user "{name}""#)]
fn admin_user(world: &mut TaskLifecycleWorld, name: String) -> Result<(), eyre::Report> {
    register(world, name, Role::Admin)
}

#[given(r#""{name}" has a task titled "{title}" with status "{status}""#)]
fn user_has_task(
    world: &mut TaskLifecycleWorld,
    name: String,
    title: String,
    status: String,
) -> Result<(), eyre::Report> {
    let actor = world.actor(&name)?;
    let request = CreateTaskRequest::new(title.clone(), format!("{title} details"))
        .with_status(status);
    let task = run_async(world.tasks.create(actor, request)).wrap_err("create scenario task")?;
    world.task_ids.insert(title, task.id());
    Ok(())
}
