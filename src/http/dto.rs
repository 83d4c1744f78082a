//! Request and response bodies.

use crate::identity::domain::{User, UserId};
use crate::task::domain::{OwnedTask, Task, TaskBoard, TaskId, TaskOwner, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Public view of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    /// User identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Role name.
    pub role: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            name: user.name().as_str().to_owned(),
            email: user.email().as_str().to_owned(),
            role: user.role().as_str().to_owned(),
        }
    }
}

/// Owner summary embedded in listed tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOwnerResponse {
    /// Owner identifier.
    pub id: UserId,
    /// Owner display name.
    pub name: String,
    /// Owner email.
    pub email: String,
}

impl From<&TaskOwner> for TaskOwnerResponse {
    fn from(owner: &TaskOwner) -> Self {
        Self {
            id: owner.id,
            name: owner.name.clone(),
            email: owner.email.clone(),
        }
    }
}

/// Public view of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResponse {
    /// Task identifier.
    pub id: TaskId,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Lifecycle status.
    pub status: TaskStatus,
    /// Owner identifier.
    pub user_id: UserId,
    /// Owner summary, present when the owner was loaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<TaskOwnerResponse>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<&Task> for TaskResponse {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id(),
            title: task.title().as_str().to_owned(),
            description: task.description().as_str().to_owned(),
            status: task.status(),
            user_id: task.owner(),
            user: None,
            created_at: task.created_at(),
            updated_at: task.updated_at(),
        }
    }
}

impl From<&OwnedTask> for TaskResponse {
    fn from(owned: &OwnedTask) -> Self {
        Self {
            user: Some(TaskOwnerResponse::from(owned.owner())),
            ..Self::from(owned.task())
        }
    }
}

/// `{ "data": ... }` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Data<T> {
    /// Wrapped payload.
    pub data: T,
}

impl<T> Data<T> {
    /// Wraps `data`.
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self { data }
    }
}

/// Board columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardResponse {
    /// Tasks not yet started.
    pub incomplete: Vec<TaskResponse>,
    /// Tasks being worked on.
    pub inprogress: Vec<TaskResponse>,
    /// Finished tasks.
    pub complete: Vec<TaskResponse>,
}

impl From<&TaskBoard> for BoardResponse {
    fn from(board: &TaskBoard) -> Self {
        let column = |tasks: &[OwnedTask]| tasks.iter().map(TaskResponse::from).collect();
        Self {
            incomplete: column(&board.incomplete),
            inprogress: column(&board.inprogress),
            complete: column(&board.complete),
        }
    }
}

/// `{ "user": ... }` envelope.
#[derive(Debug, Clone, Serialize)]
pub struct UserEnvelope {
    /// The user.
    pub user: UserResponse,
}

/// Successful login body.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Plaintext bearer token.
    pub token: String,
    /// The authenticated user.
    pub user: UserResponse,
}

/// Plain message body.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    /// Message text.
    pub message: &'static str,
}

/// Registration body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterBody {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Login body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginBody {
    /// Login email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Task creation body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateTaskBody {
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Optional initial status.
    pub status: Option<String>,
}

/// Task update body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateTaskBody {
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Required status.
    pub status: Option<String>,
}
