//! Task aggregate root and related lifecycle types.

use super::{ParseTaskStatusError, TaskDomainError, TaskId};
use crate::identity::domain::{User, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_TITLE_LENGTH: usize = 255;

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Task has not been started.
    #[default]
    Incomplete,
    /// Task is being worked on.
    InProgress,
    /// Task is finished; only admins may modify it further.
    Complete,
}

impl TaskStatus {
    /// Every status in board column order.
    pub const ALL: [Self; 3] = [Self::Incomplete, Self::InProgress, Self::Complete];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Incomplete => "incomplete",
            Self::InProgress => "inprogress",
            Self::Complete => "complete",
        }
    }

    /// Returns the capitalized label used in notifications.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Incomplete => "Incomplete",
            Self::InProgress => "Inprogress",
            Self::Complete => "Complete",
        }
    }

    /// Returns `true` for the terminal [`TaskStatus::Complete`] status.
    #[must_use]
    pub const fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "incomplete" => Ok(Self::Incomplete),
            "inprogress" => Ok(Self::InProgress),
            "complete" => Ok(Self::Complete),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated task title. Titles are unique across all tasks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskTitle(String);

impl TaskTitle {
    /// Creates a validated, trimmed title.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] or
    /// [`TaskDomainError::TitleTooLong`].
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyTitle);
        }
        if trimmed.chars().count() > MAX_TITLE_LENGTH {
            return Err(TaskDomainError::TitleTooLong {
                max: MAX_TITLE_LENGTH,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the title as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated, non-empty task description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskDescription(String);

impl TaskDescription {
    /// Creates a validated, trimmed description.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyDescription`] when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyDescription);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the description as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validated fields for a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Task title.
    pub title: TaskTitle,
    /// Task description.
    pub description: TaskDescription,
    /// Initial status.
    pub status: TaskStatus,
    /// Creating user.
    pub owner: UserId,
}

/// Validated replacement fields for an existing task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRevision {
    /// New title.
    pub title: TaskTitle,
    /// New description.
    pub description: TaskDescription,
    /// New status.
    pub status: TaskStatus,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: TaskTitle,
    description: TaskDescription,
    status: TaskStatus,
    owner: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: TaskTitle,
    /// Persisted description.
    pub description: TaskDescription,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Persisted owner.
    pub owner: UserId,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task with a fresh identifier.
    #[must_use]
    pub fn new(new_task: NewTask, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            title: new_task.title,
            description: new_task.description,
            status: new_task.status,
            owner: new_task.owner,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            status: data.status,
            owner: data.owner,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub const fn description(&self) -> &TaskDescription {
        &self.description
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Overwrites title, description, and status. The owner never changes.
    ///
    /// Returns `true` when this revision moved the task into
    /// [`TaskStatus::Complete`] from any other status.
    pub fn revise(&mut self, revision: TaskRevision, clock: &impl Clock) -> bool {
        let completes = !self.status.is_complete() && revision.status.is_complete();
        self.title = revision.title;
        self.description = revision.description;
        self.status = revision.status;
        self.updated_at = clock.utc();
        completes
    }
}

/// Owner details materialized alongside listed tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOwner {
    /// Owner identifier.
    pub id: UserId,
    /// Owner display name.
    pub name: String,
    /// Owner email.
    pub email: String,
}

impl From<&User> for TaskOwner {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            name: user.name().as_str().to_owned(),
            email: user.email().as_str().to_owned(),
        }
    }
}

/// A task together with its materialized owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedTask {
    task: Task,
    owner: TaskOwner,
}

impl OwnedTask {
    /// Pairs a task with its owner.
    #[must_use]
    pub const fn new(task: Task, owner: TaskOwner) -> Self {
        Self { task, owner }
    }

    /// Returns the task.
    #[must_use]
    pub const fn task(&self) -> &Task {
        &self.task
    }

    /// Returns the materialized owner.
    #[must_use]
    pub const fn owner(&self) -> &TaskOwner {
        &self.owner
    }
}
