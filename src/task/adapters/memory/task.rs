//! In-memory repository for task lifecycle storage.

use async_trait::async_trait;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::identity::domain::UserId;
use crate::task::{
    domain::{Task, TaskId, TaskTitle},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
///
/// Uniqueness checks and inserts happen under a single write lock, so
/// concurrent stores of the same title admit exactly one winner.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, StoredTask>,
    title_index: HashMap<TaskTitle, TaskId>,
    next_sequence: u64,
}

#[derive(Debug, Clone)]
struct StoredTask {
    task: Task,
    sequence: u64,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl InMemoryTaskState {
    fn title_taken_by_other(&self, title: &TaskTitle, id: TaskId) -> bool {
        self.title_index
            .get(title)
            .is_some_and(|holder| *holder != id)
    }

    /// Returns matching tasks ordered by creation time, newest first. Ties
    /// fall back to insertion order so listings stay deterministic.
    fn collect_newest_first(&self, filter: impl Fn(&Task) -> bool) -> Vec<Task> {
        let mut stored: Vec<&StoredTask> = self
            .tasks
            .values()
            .filter(|entry| filter(&entry.task))
            .collect();
        stored.sort_by_key(|entry| Reverse((entry.task.created_at(), entry.sequence)));
        stored.into_iter().map(|entry| entry.task.clone()).collect()
    }
}

fn lock_error(err: impl std::fmt::Display) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        if state.title_index.contains_key(task.title()) {
            return Err(TaskRepositoryError::DuplicateTitle(task.title().clone()));
        }

        let sequence = state.next_sequence;
        state.next_sequence += 1;
        state.title_index.insert(task.title().clone(), task.id());
        state.tasks.insert(
            task.id(),
            StoredTask {
                task: task.clone(),
                sequence,
            },
        );
        Ok(())
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.title_taken_by_other(task.title(), task.id()) {
            return Err(TaskRepositoryError::DuplicateTitle(task.title().clone()));
        }

        let previous_title = {
            let entry = state
                .tasks
                .get_mut(&task.id())
                .ok_or(TaskRepositoryError::NotFound(task.id()))?;
            let previous = entry.task.title().clone();
            entry.task = task.clone();
            previous
        };

        if previous_title != *task.title() {
            state.title_index.remove(&previous_title);
            state.title_index.insert(task.title().clone(), task.id());
        }
        Ok(())
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let removed = state
            .tasks
            .remove(&id)
            .ok_or(TaskRepositoryError::NotFound(id))?;
        state.title_index.remove(removed.task.title());
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.tasks.get(&id).map(|entry| entry.task.clone()))
    }

    async fn find_by_title(&self, title: &TaskTitle) -> TaskRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .title_index
            .get(title)
            .and_then(|id| state.tasks.get(id))
            .map(|entry| entry.task.clone()))
    }

    async fn list_by_owner(&self, owner: UserId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.collect_newest_first(|task| task.owner() == owner))
    }

    async fn list_all(&self) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.collect_newest_first(|_| true))
    }
}
