//! Task persistence against `PostgreSQL`.

use super::helpers::{new_task, new_user, repositories};
use mockable::DefaultClock;
use taskboard::{
    identity::domain::Role,
    task::{
        domain::{TaskDescription, TaskId, TaskRevision, TaskStatus, TaskTitle},
        ports::TaskRepositoryError,
    },
};

#[tokio::test(flavor = "multi_thread")]
async fn tasks_round_trip_by_id_and_title() {
    let Some(repos) = repositories() else { return };
    let owner = new_user(Role::Standard);
    repos.users.store(&owner).await.expect("store owner");
    let task = new_task(&owner, TaskStatus::InProgress);
    repos.tasks.store(&task).await.expect("store task");

    let by_id = repos
        .tasks
        .find_by_id(task.id())
        .await
        .expect("lookup")
        .expect("task exists");
    let by_title = repos
        .tasks
        .find_by_title(task.title())
        .await
        .expect("lookup")
        .expect("task exists");

    assert_eq!(by_id.title(), task.title());
    assert_eq!(by_id.status(), TaskStatus::InProgress);
    assert_eq!(by_id.owner(), owner.id());
    assert_eq!(by_title.id(), task.id());
}

#[tokio::test(flavor = "multi_thread")]
async fn duplicate_titles_are_rejected_by_the_index() {
    let Some(repos) = repositories() else { return };
    let owner = new_user(Role::Standard);
    repos.users.store(&owner).await.expect("store owner");
    let first = new_task(&owner, TaskStatus::Incomplete);
    repos.tasks.store(&first).await.expect("store first");

    let mut second = new_task(&owner, TaskStatus::Incomplete);
    second.revise(
        TaskRevision {
            title: first.title().clone(),
            description: TaskDescription::new("Clash").expect("valid text"),
            status: TaskStatus::Incomplete,
        },
        &DefaultClock,
    );
    let result = repos.tasks.store(&second).await;

    assert!(matches!(
        result,
        Err(TaskRepositoryError::DuplicateTitle(ref title)) if title == first.title()
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn update_persists_revisions() {
    let Some(repos) = repositories() else { return };
    let owner = new_user(Role::Standard);
    repos.users.store(&owner).await.expect("store owner");
    let mut task = new_task(&owner, TaskStatus::Incomplete);
    repos.tasks.store(&task).await.expect("store task");

    let renamed = TaskTitle::new(format!("{} renamed", task.title())).expect("valid title");
    task.revise(
        TaskRevision {
            title: renamed.clone(),
            description: TaskDescription::new("Revised").expect("valid text"),
            status: TaskStatus::Complete,
        },
        &DefaultClock,
    );
    repos.tasks.update(&task).await.expect("update");

    let stored = repos
        .tasks
        .find_by_id(task.id())
        .await
        .expect("lookup")
        .expect("task exists");
    assert_eq!(stored.title(), &renamed);
    assert_eq!(stored.status(), TaskStatus::Complete);
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_rows_are_not_found() {
    let Some(repos) = repositories() else { return };
    let owner = new_user(Role::Standard);
    let ghost = new_task(&owner, TaskStatus::Incomplete);
    let missing = TaskId::new();

    let update = repos.tasks.update(&ghost).await;
    let delete = repos.tasks.delete(missing).await;

    assert!(matches!(update, Err(TaskRepositoryError::NotFound(id)) if id == ghost.id()));
    assert!(matches!(delete, Err(TaskRepositoryError::NotFound(id)) if id == missing));
}

#[tokio::test(flavor = "multi_thread")]
async fn owner_listing_is_newest_first() {
    let Some(repos) = repositories() else { return };
    let owner = new_user(Role::Standard);
    let other = new_user(Role::Standard);
    repos.users.store(&owner).await.expect("store owner");
    repos.users.store(&other).await.expect("store other");

    let older = new_task(&owner, TaskStatus::Incomplete);
    repos.tasks.store(&older).await.expect("store older");
    let foreign = new_task(&other, TaskStatus::Incomplete);
    repos.tasks.store(&foreign).await.expect("store foreign");
    let newer = new_task(&owner, TaskStatus::Complete);
    repos.tasks.store(&newer).await.expect("store newer");

    let listed: Vec<TaskId> = repos
        .tasks
        .list_by_owner(owner.id())
        .await
        .expect("list")
        .iter()
        .map(|task| task.id())
        .collect();

    assert_eq!(listed, [newer.id(), older.id()]);
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_removes_the_row() {
    let Some(repos) = repositories() else { return };
    let owner = new_user(Role::Standard);
    repos.users.store(&owner).await.expect("store owner");
    let task = new_task(&owner, TaskStatus::Incomplete);
    repos.tasks.store(&task).await.expect("store task");

    repos.tasks.delete(task.id()).await.expect("delete");

    assert!(
        repos
            .tasks
            .find_by_id(task.id())
            .await
            .expect("lookup")
            .is_none()
    );
}
