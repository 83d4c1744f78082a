//! Shared helpers for `PostgreSQL` integration tests.

use std::sync::OnceLock;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::{Connection, PgConnection};
use mockable::DefaultClock;
use taskboard::{
    app::Repositories,
    identity::domain::{EmailAddress, NewUser, PasswordHash, Role, User, UserName},
    task::{
        adapters::postgres::TaskPgPool,
        domain::{NewTask, Task, TaskDescription, TaskStatus, TaskTitle},
    },
};
use uuid::Uuid;

/// Environment variable naming the disposable test database.
pub const DATABASE_URL_VAR: &str = "TEST_DATABASE_URL";

/// SQL to drop the account and task tables.
pub const DROP_SCHEMA_SQL: &str =
    include_str!("../../migrations/2026-10-19-000000_create_taskboard_tables/down.sql");

/// SQL to create the account and task tables.
pub const CREATE_SCHEMA_SQL: &str =
    include_str!("../../migrations/2026-10-19-000000_create_taskboard_tables/up.sql");

/// SQL to drop the event queue table.
pub const DROP_EVENTS_SQL: &str =
    include_str!("../../migrations/2026-10-20-000000_create_task_events/down.sql");

/// SQL to create the event queue table.
pub const CREATE_EVENTS_SQL: &str =
    include_str!("../../migrations/2026-10-20-000000_create_task_events/up.sql");

static SCHEMA: OnceLock<Result<(), String>> = OnceLock::new();

/// Returns repositories over the test database, or `None` when the database
/// is not configured.
///
/// # Panics
///
/// Panics when the schema cannot be applied or the pool cannot be built.
#[must_use]
pub fn repositories() -> Option<Repositories> {
    let url = prepared_database_url()?;
    Some(Repositories::postgres(&url).expect("connection pool should build"))
}

fn prepared_database_url() -> Option<String> {
    let url = std::env::var(DATABASE_URL_VAR).ok()?;
    let schema = SCHEMA.get_or_init(|| reset_schema(&url));
    if let Err(err) = schema {
        panic!("failed to prepare test schema: {err}");
    }
    Some(url)
}

fn reset_schema(url: &str) -> Result<(), String> {
    let mut connection = PgConnection::establish(url).map_err(|err| err.to_string())?;
    [
        DROP_EVENTS_SQL,
        DROP_SCHEMA_SQL,
        CREATE_SCHEMA_SQL,
        CREATE_EVENTS_SQL,
    ]
    .into_iter()
    .try_for_each(|sql| connection.batch_execute(sql))
    .map_err(|err| err.to_string())
}

/// Returns `prefix` with a random suffix so parallel tests never collide.
#[must_use]
pub fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

/// Builds a standard user with a unique email.
#[must_use]
pub fn new_user(role: Role) -> User {
    User::new(
        NewUser {
            name: UserName::new("Test User").expect("valid name"),
            email: EmailAddress::new(format!("{}@example.com", unique("user")))
                .expect("valid email"),
            password_hash: PasswordHash::create("password123").expect("valid password"),
            role,
        },
        &DefaultClock,
    )
}

/// Returns a connection pool over the test database, or `None` when the
/// database is not configured.
///
/// # Panics
///
/// Panics when the schema cannot be applied or the pool cannot be built.
#[must_use]
pub fn pool() -> Option<TaskPgPool> {
    let url = prepared_database_url()?;
    let manager = ConnectionManager::<PgConnection>::new(url);
    Some(Pool::builder().build(manager).expect("connection pool should build"))
}

/// Builds a task for `owner` with a unique title.
#[must_use]
pub fn new_task(owner: &User, status: TaskStatus) -> Task {
    Task::new(
        NewTask {
            title: TaskTitle::new(unique("task")).expect("valid title"),
            description: TaskDescription::new("Persisted in PostgreSQL").expect("valid text"),
            status,
            owner: owner.id(),
        },
        &DefaultClock,
    )
}
