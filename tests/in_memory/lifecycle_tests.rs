//! End-to-end task lifecycle flows over in-memory storage.

use super::helpers::{TestApp, app};
use rstest::rstest;
use taskboard::{
    identity::domain::Role,
    task::{
        domain::{OwnedTask, TaskStatus},
        ports::EventSource,
        services::{CreateTaskRequest, TaskLifecycleError, UpdateTaskRequest},
    },
};

fn titles(tasks: &[OwnedTask]) -> Vec<String> {
    tasks
        .iter()
        .map(|owned| owned.task().title().as_str().to_owned())
        .collect()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn users_work_on_their_own_tasks_while_admins_see_all(app: TestApp) {
    let alice = app.register("Alice", Role::Standard).await;
    let bob = app.register("Bob", Role::Standard).await;
    let admin = app.register("Root", Role::Admin).await;

    app.create_task(alice, "Alice plans", "incomplete").await;
    app.create_task(bob, "Bob builds", "inprogress").await;
    app.create_task(alice, "Alice ships", "incomplete").await;

    let tasks = &app.components.tasks;
    let alice_view = tasks.list_visible(alice).await.expect("alice listing");
    let bob_view = tasks.list_visible(bob).await.expect("bob listing");
    let admin_view = tasks.list_visible(admin).await.expect("admin listing");

    assert_eq!(titles(&alice_view), ["Alice ships", "Alice plans"]);
    assert_eq!(titles(&bob_view), ["Bob builds"]);
    assert_eq!(
        titles(&admin_view),
        ["Alice ships", "Bob builds", "Alice plans"]
    );
    assert!(
        admin_view
            .iter()
            .any(|owned| owned.owner().email == "bob@example.com")
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completion_locks_the_task_for_its_owner(app: TestApp) {
    let alice = app.register("Alice", Role::Standard).await;
    let admin = app.register("Root", Role::Admin).await;
    let task = app.create_task(alice, "Finish report", "inprogress").await;
    let tasks = &app.components.tasks;

    tasks
        .update(
            alice,
            task.id(),
            UpdateTaskRequest::new("Finish report", "Sent to team", "complete"),
        )
        .await
        .expect("owner may complete");

    let reopen = tasks
        .update(
            alice,
            task.id(),
            UpdateTaskRequest::new("Finish report", "Oops", "inprogress"),
        )
        .await;
    assert!(matches!(reopen, Err(TaskLifecycleError::Unauthorized)));

    let delete = tasks.delete(alice, task.id()).await;
    assert!(matches!(delete, Err(TaskLifecycleError::Unauthorized)));

    let reopened = tasks
        .update(
            admin,
            task.id(),
            UpdateTaskRequest::new("Finish report", "Needs another pass", "inprogress"),
        )
        .await
        .expect("admin may reopen");
    assert_eq!(reopened.status(), TaskStatus::InProgress);

    tasks
        .update(
            alice,
            task.id(),
            UpdateTaskRequest::new("Finish report", "Second pass", "inprogress"),
        )
        .await
        .expect("reopened task is editable by its owner again");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listings_reflect_every_mutation(app: TestApp) {
    let alice = app.register("Alice", Role::Standard).await;
    let admin = app.register("Root", Role::Admin).await;
    let tasks = &app.components.tasks;

    assert!(tasks.list_visible(alice).await.expect("empty").is_empty());
    assert!(tasks.list_visible(admin).await.expect("empty").is_empty());

    let task = app.create_task(alice, "Cached", "incomplete").await;
    assert_eq!(tasks.list_visible(alice).await.expect("after create").len(), 1);
    assert_eq!(tasks.list_visible(admin).await.expect("after create").len(), 1);

    tasks
        .update(
            admin,
            task.id(),
            UpdateTaskRequest::new("Cached and renamed", "Edited by admin", "complete"),
        )
        .await
        .expect("admin update");
    let owner_view = tasks.list_visible(alice).await.expect("after update");
    assert_eq!(titles(&owner_view), ["Cached and renamed"]);

    tasks.delete(admin, task.id()).await.expect("admin delete");
    assert!(tasks.list_visible(alice).await.expect("after delete").is_empty());
    assert!(tasks.list_visible(admin).await.expect("after delete").is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_titles_are_rejected_for_everyone(app: TestApp) {
    let alice = app.register("Alice", Role::Standard).await;
    let admin = app.register("Root", Role::Admin).await;
    app.create_task(alice, "Unique", "incomplete").await;

    let result = app
        .components
        .tasks
        .create(admin, CreateTaskRequest::new("Unique", "Admin copy"))
        .await;

    let Err(TaskLifecycleError::Validation(errors)) = result else {
        panic!("expected a validation error, got {result:?}");
    };
    assert_eq!(
        errors.messages("title"),
        ["The title has already been taken."]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn mutations_queue_lifecycle_events(app: TestApp) {
    let alice = app.register("Alice", Role::Standard).await;
    let task = app.create_task(alice, "Evented", "incomplete").await;
    app.components
        .tasks
        .update(
            alice,
            task.id(),
            UpdateTaskRequest::new("Evented", "Done", "complete"),
        )
        .await
        .expect("complete");
    let locked = app.components.tasks.delete(alice, task.id()).await;
    assert!(matches!(locked, Err(TaskLifecycleError::Unauthorized)));

    let mut events = app.components.events;
    let created = events.next().await.expect("created event");
    let completed = events.next().await.expect("completed event");

    assert_eq!(created.event().name(), "created");
    assert_eq!(created.event().task().id(), task.id());
    assert_eq!(completed.event().name(), "completed");
    assert_eq!(completed.event().task().status(), TaskStatus::Complete);
    assert_eq!(created.sequence(), None);
}
