//! Domain model for task lifecycle management.
//!
//! The task domain models field validation, the status lifecycle, the
//! authorization policy, and lifecycle events while keeping all
//! infrastructure concerns outside of the domain boundary.

mod board;
mod error;
mod event;
mod ids;
pub mod policy;
mod task;

pub use board::TaskBoard;
pub use error::{ParseTaskStatusError, TaskDomainError, ValidationErrors};
pub use event::TaskLifecycleEvent;
pub use ids::TaskId;
pub use task::{
    NewTask, OwnedTask, PersistedTaskData, Task, TaskDescription, TaskOwner, TaskRevision,
    TaskStatus, TaskTitle,
};
