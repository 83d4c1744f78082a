//! Cache port for materialized task listings.

use crate::identity::domain::UserId;
use crate::task::domain::OwnedTask;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task list cache operations.
pub type TaskCacheResult<T> = Result<T, TaskCacheError>;

/// Typed key for a cached task listing.
///
/// Rendered as `tasks_user_{id}` and `tasks_all` for stores that need string
/// keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskListKey {
    /// Tasks owned by one user.
    Owner(UserId),
    /// Every task, as shown to admins.
    All,
}

impl TaskListKey {
    /// Returns the key for `user_id`'s own listing.
    #[must_use]
    pub const fn for_owner(user_id: UserId) -> Self {
        Self::Owner(user_id)
    }

    /// Returns every key whose listing can contain a task owned by `owner`.
    #[must_use]
    pub const fn affected_by(owner: UserId) -> [Self; 2] {
        [Self::Owner(owner), Self::All]
    }
}

impl fmt::Display for TaskListKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owner(user_id) => write!(f, "tasks_user_{user_id}"),
            Self::All => f.write_str("tasks_all"),
        }
    }
}

/// Read-through cache for task listings.
///
/// Entries expire after an adapter-configured TTL even without explicit
/// invalidation.
#[async_trait]
pub trait TaskListCache: Send + Sync {
    /// Returns the cached listing for `key`, if present and unexpired.
    async fn get(&self, key: &TaskListKey) -> TaskCacheResult<Option<Vec<OwnedTask>>>;

    /// Stores a listing under `key`.
    async fn put(&self, key: TaskListKey, tasks: Vec<OwnedTask>) -> TaskCacheResult<()>;

    /// Removes the entry for `key`. A missing entry is not an error.
    async fn invalidate(&self, key: &TaskListKey) -> TaskCacheResult<()>;
}

/// Errors returned by cache implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskCacheError {
    /// The cache store could not be reached.
    #[error("cache unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskCacheError {
    /// Wraps a cache store error.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
