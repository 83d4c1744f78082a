//! Task list cache backed by `moka`.

use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

use crate::task::{
    domain::OwnedTask,
    ports::{TaskCacheResult, TaskListCache, TaskListKey},
};

/// Bounded, TTL-expiring task list cache.
#[derive(Debug, Clone)]
pub struct MokaTaskListCache {
    inner: Cache<TaskListKey, Arc<Vec<OwnedTask>>>,
}

impl MokaTaskListCache {
    /// Creates a cache holding at most `max_capacity` listings, each living
    /// for `ttl` after insertion.
    #[must_use]
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }
}

#[async_trait]
impl TaskListCache for MokaTaskListCache {
    async fn get(&self, key: &TaskListKey) -> TaskCacheResult<Option<Vec<OwnedTask>>> {
        Ok(self
            .inner
            .get(key)
            .await
            .map(|tasks| tasks.as_ref().clone()))
    }

    async fn put(&self, key: TaskListKey, tasks: Vec<OwnedTask>) -> TaskCacheResult<()> {
        self.inner.insert(key, Arc::new(tasks)).await;
        Ok(())
    }

    async fn invalidate(&self, key: &TaskListKey) -> TaskCacheResult<()> {
        self.inner.invalidate(key).await;
        Ok(())
    }
}
