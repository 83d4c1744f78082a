//! The lifecycle service wired over `PostgreSQL` repositories.

use std::sync::Arc;

use super::helpers::{repositories, unique};
use taskboard::{
    app::Components,
    config::AppConfig,
    identity::{domain::Role, services::RegisterUserRequest},
    notification::adapters::RecordingMailer,
    task::services::{CreateTaskRequest, TaskLifecycleError, UpdateTaskRequest},
};

#[tokio::test(flavor = "multi_thread")]
async fn lifecycle_rules_hold_over_postgres() {
    let Some(repos) = repositories() else { return };
    let components = Components::build(
        &AppConfig::default(),
        repos,
        Arc::new(RecordingMailer::new()),
    );
    let owner = components
        .auth
        .register(RegisterUserRequest::new(
            "Owner",
            format!("{}@example.com", unique("owner")),
            "password123",
        ))
        .await
        .expect("register owner")
        .actor();
    let admin = components
        .auth
        .register(
            RegisterUserRequest::new(
                "Admin",
                format!("{}@example.com", unique("admin")),
                "password123",
            )
            .with_role(Role::Admin),
        )
        .await
        .expect("register admin")
        .actor();

    let title = unique("pg-task");
    let task = components
        .tasks
        .create(owner, CreateTaskRequest::new(title.clone(), "Backed by SQL"))
        .await
        .expect("create");
    components
        .tasks
        .update(
            owner,
            task.id(),
            UpdateTaskRequest::new(title.clone(), "Done", "complete"),
        )
        .await
        .expect("complete");

    let locked = components.tasks.delete(owner, task.id()).await;
    assert!(matches!(locked, Err(TaskLifecycleError::Unauthorized)));

    let duplicate = components
        .tasks
        .create(admin, CreateTaskRequest::new(title, "Clash"))
        .await;
    assert!(matches!(duplicate, Err(TaskLifecycleError::Validation(_))));

    let visible = components.tasks.list_visible(owner).await.expect("list");
    assert_eq!(visible.len(), 1);

    components
        .tasks
        .delete(admin, task.id())
        .await
        .expect("admin delete");
    assert!(
        components
            .tasks
            .list_visible(owner)
            .await
            .expect("list")
            .is_empty()
    );
}
