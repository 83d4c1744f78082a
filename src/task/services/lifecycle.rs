//! Service layer for validated task mutations and cached listings.

use crate::identity::{
    domain::{Actor, UserId},
    ports::{UserRepository, UserRepositoryError},
};
use crate::task::{
    domain::{
        NewTask, OwnedTask, Task, TaskBoard, TaskDescription, TaskDomainError, TaskId,
        TaskLifecycleEvent, TaskOwner, TaskRevision, TaskStatus, TaskTitle, ValidationErrors,
        policy,
    },
    ports::{EventPublisher, TaskListCache, TaskListKey, TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

const TITLE_TAKEN: &str = "The title has already been taken.";

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    description: String,
    status: Option<String>,
}

impl CreateTaskRequest {
    /// Creates a request with the default status.
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            status: None,
        }
    }

    /// Sets the initial status from its wire name.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// Request payload for overwriting a task's editable fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    title: String,
    description: String,
    status: Option<String>,
}

impl UpdateTaskRequest {
    /// Creates an update request. Every field is required.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            status: Some(status.into()),
        }
    }

    /// Creates an update request that omits the status, which is rejected by
    /// validation.
    #[must_use]
    pub fn without_status(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            status: None,
        }
    }

    /// Sets the target status from its wire name.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// One or more fields were rejected.
    #[error("task validation failed: {0}")]
    Validation(ValidationErrors),
    /// The actor may not perform the operation on the task.
    #[error("this action is unauthorized")]
    Unauthorized,
    /// The task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskId),
    /// Task repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// Owner lookup failed.
    #[error(transparent)]
    Users(#[from] UserRepositoryError),
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
///
/// Every mutation runs authorize, validate, persist, invalidate, publish in
/// that order. Cache and publish failures are logged and never fail a
/// committed mutation.
pub struct TaskLifecycleService<R, U, K, P, C>
where
    R: TaskRepository + ?Sized,
    U: UserRepository + ?Sized,
    K: TaskListCache + ?Sized,
    P: EventPublisher + ?Sized,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    users: Arc<U>,
    cache: Arc<K>,
    publisher: Arc<P>,
    clock: Arc<C>,
}

impl<R, U, K, P, C> Clone for TaskLifecycleService<R, U, K, P, C>
where
    R: TaskRepository + ?Sized,
    U: UserRepository + ?Sized,
    K: TaskListCache + ?Sized,
    P: EventPublisher + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            users: Arc::clone(&self.users),
            cache: Arc::clone(&self.cache),
            publisher: Arc::clone(&self.publisher),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, U, K, P, C> TaskLifecycleService<R, U, K, P, C>
where
    R: TaskRepository + ?Sized,
    U: UserRepository + ?Sized,
    K: TaskListCache + ?Sized,
    P: EventPublisher + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub const fn new(
        repository: Arc<R>,
        users: Arc<U>,
        cache: Arc<K>,
        publisher: Arc<P>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            repository,
            users,
            cache,
            publisher,
            clock,
        }
    }

    /// Creates a task owned by `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Validation`] with every rejected field,
    /// including a title already used by another task, and repository errors
    /// otherwise.
    pub async fn create(
        &self,
        actor: Actor,
        request: CreateTaskRequest,
    ) -> TaskLifecycleResult<Task> {
        let mut errors = ValidationErrors::new();
        let parsed_title = collect(TaskTitle::new(request.title), &mut errors);
        let parsed_description = collect(TaskDescription::new(request.description), &mut errors);
        let parsed_status = collect(
            parse_optional_status(request.status.as_deref()),
            &mut errors,
        );
        if let Some(ref candidate) = parsed_title {
            self.check_title_available(candidate, None, &mut errors).await?;
        }

        let (Some(title), Some(description), Some(status), true) = (
            parsed_title,
            parsed_description,
            parsed_status,
            errors.is_empty(),
        ) else {
            return Err(TaskLifecycleError::Validation(errors));
        };

        let task = Task::new(
            NewTask {
                title,
                description,
                status,
                owner: actor.id(),
            },
            &*self.clock,
        );
        self.repository
            .store(&task)
            .await
            .map_err(map_title_conflict)?;
        info!(
            task_id = %task.id(),
            owner = %task.owner(),
            status = %task.status(),
            "task created"
        );

        self.invalidate_for(task.owner()).await;
        self.publish(TaskLifecycleEvent::Created(task.clone())).await;
        Ok(task)
    }

    /// Overwrites the title, description, and status of a task.
    ///
    /// Publishes [`TaskLifecycleEvent::Completed`] only when this update moves
    /// the task into [`TaskStatus::Complete`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task is missing,
    /// [`TaskLifecycleError::Unauthorized`] when the policy denies the change,
    /// and [`TaskLifecycleError::Validation`] for rejected fields.
    pub async fn update(
        &self,
        actor: Actor,
        task_id: TaskId,
        request: UpdateTaskRequest,
    ) -> TaskLifecycleResult<Task> {
        let mut task = self.load(task_id).await?;
        if !policy::can_modify(actor, &task) {
            debug!(task_id = %task_id, actor = %actor.id(), "update denied");
            return Err(TaskLifecycleError::Unauthorized);
        }

        let mut errors = ValidationErrors::new();
        let parsed_title = collect(TaskTitle::new(request.title), &mut errors);
        let parsed_description = collect(TaskDescription::new(request.description), &mut errors);
        let parsed_status = collect(
            parse_required_status(request.status.as_deref()),
            &mut errors,
        );
        if let Some(ref candidate) = parsed_title {
            self.check_title_available(candidate, Some(task_id), &mut errors)
                .await?;
        }

        let (Some(title), Some(description), Some(status), true) = (
            parsed_title,
            parsed_description,
            parsed_status,
            errors.is_empty(),
        ) else {
            return Err(TaskLifecycleError::Validation(errors));
        };

        let completed = task.revise(
            TaskRevision {
                title,
                description,
                status,
            },
            &*self.clock,
        );
        self.repository
            .update(&task)
            .await
            .map_err(map_title_conflict)?;
        info!(task_id = %task_id, status = %task.status(), completed, "task updated");

        self.invalidate_for(task.owner()).await;
        if completed {
            self.publish(TaskLifecycleEvent::Completed(task.clone())).await;
        }
        Ok(task)
    }

    /// Permanently removes a task. No event is published.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task is missing and
    /// [`TaskLifecycleError::Unauthorized`] when the policy denies deletion.
    pub async fn delete(&self, actor: Actor, task_id: TaskId) -> TaskLifecycleResult<()> {
        let task = self.load(task_id).await?;
        if !policy::can_delete(actor, &task) {
            debug!(task_id = %task_id, actor = %actor.id(), "delete denied");
            return Err(TaskLifecycleError::Unauthorized);
        }

        self.repository
            .delete(task_id)
            .await
            .map_err(map_title_conflict)?;
        info!(task_id = %task_id, owner = %task.owner(), "task deleted");

        self.invalidate_for(task.owner()).await;
        Ok(())
    }

    /// Loads a single task with its owner.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task or its owner is
    /// missing and [`TaskLifecycleError::Unauthorized`] when the actor is
    /// neither an admin nor the owner.
    pub async fn find(&self, actor: Actor, task_id: TaskId) -> TaskLifecycleResult<OwnedTask> {
        let task = self.load(task_id).await?;
        if !policy::can_view(actor, &task) {
            return Err(TaskLifecycleError::Unauthorized);
        }
        let Some(owner) = self.users.find_by_id(task.owner()).await? else {
            warn!(task_id = %task_id, owner = %task.owner(), "task owner missing");
            return Err(TaskLifecycleError::NotFound(task_id));
        };
        Ok(OwnedTask::new(task, TaskOwner::from(&owner)))
    }

    /// Lists the tasks owned by `user_id`, newest first, bypassing the cache.
    ///
    /// # Errors
    ///
    /// Returns repository errors.
    pub async fn list_for_user(&self, user_id: UserId) -> TaskLifecycleResult<Vec<OwnedTask>> {
        let tasks = self.repository.list_by_owner(user_id).await?;
        self.with_owners(tasks).await
    }

    /// Lists every task, newest first, bypassing the cache.
    ///
    /// # Errors
    ///
    /// Returns repository errors.
    pub async fn list_all(&self) -> TaskLifecycleResult<Vec<OwnedTask>> {
        let tasks = self.repository.list_all().await?;
        self.with_owners(tasks).await
    }

    /// Lists the tasks `actor` may see through the read-through cache.
    ///
    /// Admins see every task; everyone else sees their own.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Unauthorized`] when listing is denied and
    /// repository errors on a cache miss.
    pub async fn list_visible(&self, actor: Actor) -> TaskLifecycleResult<Vec<OwnedTask>> {
        if !policy::can_view_list(actor) {
            return Err(TaskLifecycleError::Unauthorized);
        }
        let key = if actor.is_admin() {
            TaskListKey::All
        } else {
            TaskListKey::for_owner(actor.id())
        };
        self.get_or_compute(key).await
    }

    /// Groups the tasks `actor` may see into status columns.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Self::list_visible`].
    pub async fn board(&self, actor: Actor) -> TaskLifecycleResult<TaskBoard> {
        let tasks = self.list_visible(actor).await?;
        Ok(TaskBoard::from_tasks(tasks))
    }

    async fn get_or_compute(&self, key: TaskListKey) -> TaskLifecycleResult<Vec<OwnedTask>> {
        match self.cache.get(&key).await {
            Ok(Some(tasks)) => {
                debug!(cache_key = %key, "task list cache hit");
                return Ok(tasks);
            }
            Ok(None) => debug!(cache_key = %key, "task list cache miss"),
            Err(err) => warn!(cache_key = %key, error = %err, "task list cache read failed"),
        }

        let tasks = match key {
            TaskListKey::Owner(user_id) => self.list_for_user(user_id).await?,
            TaskListKey::All => self.list_all().await?,
        };
        if let Err(err) = self.cache.put(key, tasks.clone()).await {
            warn!(cache_key = %key, error = %err, "task list cache write failed");
        }
        Ok(tasks)
    }

    async fn load(&self, task_id: TaskId) -> TaskLifecycleResult<Task> {
        self.repository
            .find_by_id(task_id)
            .await?
            .ok_or(TaskLifecycleError::NotFound(task_id))
    }

    async fn check_title_available(
        &self,
        title: &TaskTitle,
        current: Option<TaskId>,
        errors: &mut ValidationErrors,
    ) -> TaskLifecycleResult<()> {
        let holder = self.repository.find_by_title(title).await?;
        if holder.is_some_and(|existing| Some(existing.id()) != current) {
            errors.push("title", TITLE_TAKEN);
        }
        Ok(())
    }

    async fn with_owners(&self, tasks: Vec<Task>) -> TaskLifecycleResult<Vec<OwnedTask>> {
        let mut owner_ids: Vec<UserId> = tasks.iter().map(Task::owner).collect();
        owner_ids.sort_unstable();
        owner_ids.dedup();

        let owners: HashMap<UserId, TaskOwner> = self
            .users
            .find_many(&owner_ids)
            .await?
            .iter()
            .map(|user| (user.id(), TaskOwner::from(user)))
            .collect();

        Ok(tasks
            .into_iter()
            .filter_map(|task| {
                let owner = owners.get(&task.owner()).cloned();
                if owner.is_none() {
                    warn!(
                        task_id = %task.id(),
                        owner = %task.owner(),
                        "skipping task with missing owner"
                    );
                }
                owner.map(|found| OwnedTask::new(task, found))
            })
            .collect())
    }

    async fn invalidate_for(&self, owner: UserId) {
        for key in TaskListKey::affected_by(owner) {
            if let Err(err) = self.cache.invalidate(&key).await {
                warn!(cache_key = %key, error = %err, "task list cache invalidation failed");
            }
        }
    }

    async fn publish(&self, event: TaskLifecycleEvent) {
        let name = event.name();
        let task_id = event.task().id();
        if let Err(err) = self.publisher.publish(event).await {
            warn!(event = name, task_id = %task_id, error = %err, "lifecycle event dropped");
        }
    }
}

fn collect<T>(result: Result<T, TaskDomainError>, errors: &mut ValidationErrors) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            errors.push_domain(&err);
            None
        }
    }
}

fn parse_optional_status(value: Option<&str>) -> Result<TaskStatus, TaskDomainError> {
    match value.map(str::trim) {
        None | Some("") => Ok(TaskStatus::default()),
        Some(name) => Ok(TaskStatus::try_from(name)?),
    }
}

fn parse_required_status(value: Option<&str>) -> Result<TaskStatus, TaskDomainError> {
    match value.map(str::trim) {
        None | Some("") => Err(TaskDomainError::MissingStatus),
        Some(name) => Ok(TaskStatus::try_from(name)?),
    }
}

/// A title conflict detected by the store surfaces as a field error, the same
/// as one caught by the pre-check.
fn map_title_conflict(err: TaskRepositoryError) -> TaskLifecycleError {
    match err {
        TaskRepositoryError::DuplicateTitle(_) => {
            let mut errors = ValidationErrors::new();
            errors.push("title", TITLE_TAKEN);
            TaskLifecycleError::Validation(errors)
        }
        TaskRepositoryError::NotFound(task_id) => TaskLifecycleError::NotFound(task_id),
        other => TaskLifecycleError::Repository(other),
    }
}
