//! `PostgreSQL` adapters for task lifecycle persistence and the durable
//! event queue.

mod models;
mod outbox;
mod repository;
mod schema;

pub use outbox::{OutboxEventSource, OutboxSettings, PostgresEventOutbox};
pub use repository::{PostgresTaskRepository, TaskPgPool};
