//! Component wiring for the running service.
//!
//! Builds repositories for the configured storage mode, connects the lifecycle
//! service to the event queue, and prepares the notification dispatcher that
//! drains it. `postgres` mode queues events in a durable table; `in_memory`
//! mode uses a process-local channel.

use crate::config::{AdminBootstrap, AppConfig, StorageMode};
use crate::identity::{
    adapters::{
        memory::{InMemoryAccessTokenRepository, InMemoryUserRepository},
        postgres::{PostgresAccessTokenRepository, PostgresUserRepository},
    },
    domain::{EmailAddress, Role, User},
    ports::{AccessTokenRepository, UserRepository},
    services::{AuthService, IdentityServiceError, RegisterUserRequest},
};
use crate::notification::{
    adapters::LogMailer,
    ports::Mailer,
    services::{NotificationDispatcher, RetryPolicy},
};
use crate::task::{
    adapters::{
        cache::MokaTaskListCache,
        memory::InMemoryTaskRepository,
        postgres::{
            OutboxEventSource, OutboxSettings, PostgresEventOutbox, PostgresTaskRepository,
        },
        queue::event_queue,
    },
    ports::{EventPublisher, EventSource, TaskListCache, TaskRepository},
    services::TaskLifecycleService,
};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use mockable::DefaultClock;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::info;

/// Task lifecycle service over type-erased ports.
pub type SharedTaskService = TaskLifecycleService<
    dyn TaskRepository,
    dyn UserRepository,
    dyn TaskListCache,
    dyn EventPublisher,
    DefaultClock,
>;

/// Authentication service over type-erased ports.
pub type SharedAuthService =
    AuthService<dyn UserRepository, dyn AccessTokenRepository, DefaultClock>;

/// Notification dispatcher over type-erased ports.
pub type SharedDispatcher = NotificationDispatcher<dyn UserRepository, dyn Mailer>;

/// Persistence adapters for one storage mode.
#[derive(Clone)]
pub struct Repositories {
    /// User accounts.
    pub users: Arc<dyn UserRepository>,
    /// Bearer token digests.
    pub tokens: Arc<dyn AccessTokenRepository>,
    /// Tasks.
    pub tasks: Arc<dyn TaskRepository>,
    /// Durable event queue; `None` selects the in-process channel.
    pub outbox: Option<PostgresEventOutbox>,
}

impl Repositories {
    /// Creates process-local repositories.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            tokens: Arc::new(InMemoryAccessTokenRepository::new()),
            tasks: Arc::new(InMemoryTaskRepository::new()),
            outbox: None,
        }
    }

    /// Creates `PostgreSQL` repositories sharing one connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Pool`] when the pool cannot be built.
    pub fn postgres(database_url: &str) -> Result<Self, AppError> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = Pool::builder().build(manager)?;
        Ok(Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            tokens: Arc::new(PostgresAccessTokenRepository::new(pool.clone())),
            tasks: Arc::new(PostgresTaskRepository::new(pool.clone())),
            outbox: Some(PostgresEventOutbox::new(pool)),
        })
    }

    /// Creates repositories for the configured storage mode.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] when `postgres` mode lacks a URL or the pool
    /// cannot be built.
    pub fn for_config(config: &AppConfig) -> Result<Self, AppError> {
        match config.storage_mode {
            StorageMode::InMemory => Ok(Self::in_memory()),
            StorageMode::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .ok_or(AppError::MissingDatabaseUrl)?;
                Self::postgres(url)
            }
        }
    }
}

/// Wired application services.
pub struct Components {
    /// Task lifecycle service.
    pub tasks: Arc<SharedTaskService>,
    /// Authentication service.
    pub auth: Arc<SharedAuthService>,
    /// User repository shared by the services.
    pub users: Arc<dyn UserRepository>,
    /// Dispatcher to be spawned with [`Components::events`].
    pub dispatcher: SharedDispatcher,
    /// Receiving end of the lifecycle event queue.
    pub events: Box<dyn EventSource>,
    /// Stops a durable event source once set to `true`. The in-process
    /// queue instead closes when the lifecycle service is dropped.
    pub stop_events: watch::Sender<bool>,
}

impl Components {
    /// Wires services over `repositories` using `mailer` for notifications.
    #[must_use]
    pub fn build(
        config: &AppConfig,
        repositories: Repositories,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let clock = Arc::new(DefaultClock);
        let (stop_events, stop_signal) = watch::channel(false);
        let (publisher, events) = event_channel(config, repositories.outbox, stop_signal);
        let cache: Arc<dyn TaskListCache> = Arc::new(MokaTaskListCache::new(
            config.task_cache_capacity,
            config.task_cache_ttl,
        ));

        let tasks = Arc::new(TaskLifecycleService::new(
            repositories.tasks,
            Arc::clone(&repositories.users),
            cache,
            publisher,
            Arc::clone(&clock),
        ));
        let auth = Arc::new(AuthService::new(
            Arc::clone(&repositories.users),
            repositories.tokens,
            clock,
        ));
        let dispatcher = NotificationDispatcher::new(
            Arc::clone(&repositories.users),
            mailer,
            RetryPolicy::new(config.notification_max_attempts, config.notification_backoff),
        );

        Self {
            tasks,
            auth,
            users: repositories.users,
            dispatcher,
            events,
            stop_events,
        }
    }

    /// Wires services for `config`, logging outgoing mail.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] when repositories cannot be created.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let repositories = Repositories::for_config(config)?;
        let mailer: Arc<dyn Mailer> = Arc::new(LogMailer::new(config.mail_from.clone()));
        Ok(Self::build(config, repositories, mailer))
    }
}

fn event_channel(
    config: &AppConfig,
    outbox: Option<PostgresEventOutbox>,
    stop_signal: watch::Receiver<bool>,
) -> (Arc<dyn EventPublisher>, Box<dyn EventSource>) {
    outbox.map_or_else(
        || {
            let (publisher, receiver) = event_queue();
            let events: Box<dyn EventSource> = Box::new(receiver);
            (Arc::new(publisher) as Arc<dyn EventPublisher>, events)
        },
        |durable| {
            let settings = OutboxSettings {
                poll_interval: config.outbox_poll_interval,
                lease: config.outbox_lease,
                ..OutboxSettings::default()
            };
            let events: Box<dyn EventSource> =
                Box::new(OutboxEventSource::new(durable.clone(), settings, stop_signal));
            (Arc::new(durable) as Arc<dyn EventPublisher>, events)
        },
    )
}

/// Registers the configured admin account unless an admin with that email exists.
///
/// Returns the admin user, whether newly created or pre-existing.
///
/// # Errors
///
/// Returns [`AppError::Bootstrap`] when the credentials are invalid or
/// persistence fails, and [`AppError::AdminEmailTaken`] when the email
/// belongs to an account without the admin role.
pub async fn ensure_admin(
    auth: &SharedAuthService,
    users: &dyn UserRepository,
    admin: &AdminBootstrap,
) -> Result<User, AppError> {
    if let Ok(email) = EmailAddress::new(admin.email.as_str())
        && let Some(existing) = users
            .find_by_email(&email)
            .await
            .map_err(|err| AppError::Bootstrap(err.into()))?
    {
        if !existing.role().is_admin() {
            return Err(AppError::AdminEmailTaken(existing.email().to_string()));
        }
        info!(user_id = %existing.id(), "admin account already present");
        return Ok(existing);
    }

    let request = RegisterUserRequest::new(
        admin.name.as_str(),
        admin.email.as_str(),
        admin.password.as_str(),
    )
    .with_role(Role::Admin);
    let user = auth.register(request).await.map_err(AppError::Bootstrap)?;
    info!(user_id = %user.id(), "admin account created");
    Ok(user)
}

/// Errors raised while assembling the application.
#[derive(Debug, Error)]
pub enum AppError {
    /// `postgres` mode was selected without a database URL.
    #[error("DATABASE_URL is required for postgres storage")]
    MissingDatabaseUrl,
    /// The connection pool could not be built.
    #[error("failed to build connection pool: {0}")]
    Pool(#[from] PoolError),
    /// The admin account could not be ensured.
    #[error("failed to bootstrap admin account: {0}")]
    Bootstrap(#[source] IdentityServiceError),
    /// The admin email belongs to an account without the admin role.
    #[error("admin email {0} belongs to a non-admin account")]
    AdminEmailTaken(String),
}
