//! Lifecycle events emitted by task mutations.

use super::Task;
use serde::{Deserialize, Serialize};

/// Immutable fact describing a task state change, consumed asynchronously by
/// the notification dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "task", rename_all = "snake_case")]
pub enum TaskLifecycleEvent {
    /// A task was created.
    Created(Task),
    /// A task moved into the complete status.
    Completed(Task),
}

impl TaskLifecycleEvent {
    /// Returns the task snapshot carried by the event.
    #[must_use]
    pub const fn task(&self) -> &Task {
        match self {
            Self::Created(task) | Self::Completed(task) => task,
        }
    }

    /// Returns a stable name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Created(_) => "created",
            Self::Completed(_) => "completed",
        }
    }
}
