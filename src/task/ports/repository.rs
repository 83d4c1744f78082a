//! Repository port for task persistence and listing.

use crate::identity::domain::UserId;
use crate::task::domain::{Task, TaskId, TaskTitle};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// Implementations enforce title uniqueness themselves, so two concurrent
/// writers of the same title cannot both succeed.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists or [`TaskRepositoryError::DuplicateTitle`] when another task
    /// already uses the title.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Persists title, description, status, and timestamp changes.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist
    /// or [`TaskRepositoryError::DuplicateTitle`] when another task already
    /// uses the new title.
    async fn update(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Permanently removes a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Finds the task using `title`, if any.
    async fn find_by_title(&self, title: &TaskTitle) -> TaskRepositoryResult<Option<Task>>;

    /// Returns the tasks owned by `owner`, newest first.
    async fn list_by_owner(&self, owner: UserId) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns every task, newest first.
    async fn list_all(&self) -> TaskRepositoryResult<Vec<Task>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// Another task already uses the title.
    #[error("duplicate task title: {0}")]
    DuplicateTitle(TaskTitle),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
