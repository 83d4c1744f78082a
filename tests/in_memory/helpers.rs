//! Shared helpers for in-memory integration tests.

use std::sync::Arc;
use std::time::Duration;

use rstest::fixture;
use taskboard::{
    app::{Components, Repositories},
    config::AppConfig,
    identity::{
        domain::{Actor, Role},
        services::RegisterUserRequest,
    },
    notification::adapters::RecordingMailer,
    task::{domain::Task, services::CreateTaskRequest},
};

/// Application components over in-memory repositories with recorded mail.
pub struct TestApp {
    pub components: Components,
    pub mailer: Arc<RecordingMailer>,
}

/// Configuration with quick retries so failure paths finish promptly.
#[must_use]
pub fn test_config() -> AppConfig {
    AppConfig {
        notification_backoff: Duration::from_millis(1),
        ..AppConfig::default()
    }
}

/// Provides freshly wired components for each test.
#[fixture]
pub fn app() -> TestApp {
    TestApp::with_mailer(RecordingMailer::new())
}

impl TestApp {
    /// Wires components that deliver through `mailer`.
    #[must_use]
    pub fn with_mailer(recording: RecordingMailer) -> Self {
        let mailer = Arc::new(recording);
        let components =
            Components::build(&test_config(), Repositories::in_memory(), mailer.clone());
        Self { components, mailer }
    }

    /// Registers a user and returns the actor acting on their behalf.
    pub async fn register(&self, name: &str, role: Role) -> Actor {
        let email = format!("{}@example.com", name.to_lowercase());
        self.components
            .auth
            .register(RegisterUserRequest::new(name, email, "password123").with_role(role))
            .await
            .expect("registration should succeed")
            .actor()
    }

    /// Creates a task with the given status.
    pub async fn create_task(&self, actor: Actor, title: &str, status: &str) -> Task {
        self.components
            .tasks
            .create(
                actor,
                CreateTaskRequest::new(title, format!("{title} description")).with_status(status),
            )
            .await
            .expect("task creation should succeed")
    }
}
