//! Diesel row models for task persistence.

use super::schema::{task_events, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Lifecycle status.
    pub status: String,
    /// Owning user.
    pub user_id: uuid::Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Lifecycle status.
    pub status: String,
    /// Owning user.
    pub user_id: uuid::Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Changeset for task revisions. Ownership and creation time never change.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
pub struct TaskChangeset {
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Lifecycle status.
    pub status: String,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for queued lifecycle events.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskEventRow {
    /// Sequence number.
    pub id: i64,
    /// Serialized event.
    pub payload: serde_json::Value,
}

/// Insert model for queued lifecycle events.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_events)]
pub struct NewTaskEventRow {
    /// Serialized event.
    pub payload: serde_json::Value,
    /// Earliest claim time.
    pub available_at: DateTime<Utc>,
    /// Enqueue timestamp.
    pub created_at: DateTime<Utc>,
}
