//! Port contracts for task lifecycle management.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod cache;
pub mod events;
pub mod repository;

pub use cache::{TaskCacheError, TaskCacheResult, TaskListCache, TaskListKey};
pub use events::{
    EventPublishError, EventPublishResult, EventPublisher, EventSource, QueuedEvent,
};
pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};
