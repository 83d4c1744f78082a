//! Shared fixtures for task unit tests.

use std::sync::Arc;
use std::time::Duration;

use crate::identity::{
    adapters::memory::InMemoryUserRepository,
    domain::{Actor, EmailAddress, NewUser, PasswordHash, Role, User, UserName},
    ports::UserRepository,
};
use crate::task::{
    adapters::{
        cache::MokaTaskListCache,
        memory::{InMemoryTaskRepository, RecordingEventPublisher},
    },
    domain::Task,
    services::{CreateTaskRequest, TaskLifecycleService},
};
use mockable::DefaultClock;

pub(super) type TestService = TaskLifecycleService<
    InMemoryTaskRepository,
    InMemoryUserRepository,
    MokaTaskListCache,
    RecordingEventPublisher,
    DefaultClock,
>;

/// Lifecycle service with handles on every in-memory port.
pub(super) struct Harness {
    pub service: TestService,
    pub tasks: Arc<InMemoryTaskRepository>,
    pub users: Arc<InMemoryUserRepository>,
    pub publisher: Arc<RecordingEventPublisher>,
}

impl Harness {
    pub fn new() -> Self {
        let tasks = Arc::new(InMemoryTaskRepository::new());
        let users = Arc::new(InMemoryUserRepository::new());
        let publisher = Arc::new(RecordingEventPublisher::new());
        let cache = Arc::new(MokaTaskListCache::new(64, Duration::from_secs(3600)));
        let service = TaskLifecycleService::new(
            Arc::clone(&tasks),
            Arc::clone(&users),
            cache,
            Arc::clone(&publisher),
            Arc::new(DefaultClock),
        );
        Self {
            service,
            tasks,
            users,
            publisher,
        }
    }

    pub async fn user(&self, name: &str, role: Role) -> Actor {
        let user = user(name, role);
        self.users.store(&user).await.expect("store user");
        user.actor()
    }

    pub async fn task(&self, actor: Actor, title: &str, status: &str) -> Task {
        self.service
            .create(
                actor,
                CreateTaskRequest::new(title, format!("{title} details")).with_status(status),
            )
            .await
            .expect("create task")
    }
}

pub(super) fn user(name: &str, role: Role) -> User {
    User::new(
        NewUser {
            name: UserName::new(name).expect("valid name"),
            email: EmailAddress::new(format!("{}@example.com", name.to_lowercase()))
                .expect("valid email"),
            password_hash: PasswordHash::create("password123").expect("valid password"),
            role,
        },
        &DefaultClock,
    )
}
