//! Shared world state for task lifecycle BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use rstest::fixture;
use taskboard::{
    app::{Components, Repositories, SharedAuthService, SharedDispatcher, SharedTaskService},
    config::AppConfig,
    identity::domain::Actor,
    notification::adapters::RecordingMailer,
    task::{domain::TaskId, ports::EventSource, services::TaskLifecycleError},
};

/// Scenario world for task lifecycle behaviour tests.
pub struct TaskLifecycleWorld {
    pub tasks: Arc<SharedTaskService>,
    pub auth: Arc<SharedAuthService>,
    pub mailer: Arc<RecordingMailer>,
    pub actors: HashMap<String, Actor>,
    pub task_ids: HashMap<String, TaskId>,
    pub last_result: Option<Result<(), TaskLifecycleError>>,
    pub pending_dispatcher: Option<(SharedDispatcher, Box<dyn EventSource>)>,
}

impl TaskLifecycleWorld {
    /// Creates a world over fresh in-memory components.
    #[must_use]
    pub fn new() -> Self {
        let mailer = Arc::new(RecordingMailer::new());
        let Components {
            tasks,
            auth,
            dispatcher,
            events,
            ..
        } = Components::build(
            &AppConfig::default(),
            Repositories::in_memory(),
            mailer.clone(),
        );
        Self {
            tasks,
            auth,
            mailer,
            actors: HashMap::new(),
            task_ids: HashMap::new(),
            last_result: None,
            pending_dispatcher: Some((dispatcher, events)),
        }
    }

    /// Returns the actor registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error when no user with that name was registered.
    pub fn actor(&self, name: &str) -> Result<Actor, eyre::Report> {
        self.actors
            .get(name)
            .copied()
            .ok_or_else(|| eyre::eyre!("unknown user {name} in scenario world"))
    }

    /// Returns the identifier of the task titled `title`.
    ///
    /// # Errors
    ///
    /// Returns an error when no task with that title was created.
    pub fn task_id(&self, title: &str) -> Result<TaskId, eyre::Report> {
        self.task_ids
            .get(title)
            .copied()
            .ok_or_else(|| eyre::eyre!("unknown task {title} in scenario world"))
    }
}

impl Default for TaskLifecycleWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskLifecycleWorld {
    TaskLifecycleWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
