//! Ports for enqueuing lifecycle events and draining them again.

use crate::task::domain::TaskLifecycleEvent;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for event queue operations.
pub type EventPublishResult<T> = Result<T, EventPublishError>;

/// Enqueues lifecycle events for asynchronous consumers.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Enqueues `event`. Returning `Ok` means the queue accepted it; delivery
    /// happens later and independently of the caller.
    async fn publish(&self, event: TaskLifecycleEvent) -> EventPublishResult<()>;
}

/// An event taken from a queue that has not been settled yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedEvent {
    event: TaskLifecycleEvent,
    sequence: Option<i64>,
}

impl QueuedEvent {
    /// Wraps an event held only in process memory.
    #[must_use]
    pub const fn in_process(event: TaskLifecycleEvent) -> Self {
        Self {
            event,
            sequence: None,
        }
    }

    /// Wraps an event stored under `sequence` in a durable queue.
    #[must_use]
    pub const fn stored(sequence: i64, event: TaskLifecycleEvent) -> Self {
        Self {
            event,
            sequence: Some(sequence),
        }
    }

    /// Returns the event.
    #[must_use]
    pub const fn event(&self) -> &TaskLifecycleEvent {
        &self.event
    }

    /// Returns the storage sequence number, if the queue is durable.
    #[must_use]
    pub const fn sequence(&self) -> Option<i64> {
        self.sequence
    }
}

/// Receiving side of the event queue, drained by the notification
/// dispatcher.
///
/// Every event returned by [`EventSource::next`] is settled exactly once,
/// either acknowledged or released, before the next call.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Waits for the next event. Returns `None` once the source is closed.
    async fn next(&mut self) -> Option<QueuedEvent>;

    /// Removes a handled event from the queue.
    async fn acknowledge(&mut self, queued: &QueuedEvent) -> EventPublishResult<()>;

    /// Hands back an event whose delivery failed transiently. Durable
    /// sources redeliver it later; in-process sources drop it.
    async fn release(&mut self, queued: &QueuedEvent) -> EventPublishResult<()>;
}

#[async_trait]
impl<S> EventSource for Box<S>
where
    S: EventSource + ?Sized,
{
    async fn next(&mut self) -> Option<QueuedEvent> {
        (**self).next().await
    }

    async fn acknowledge(&mut self, queued: &QueuedEvent) -> EventPublishResult<()> {
        (**self).acknowledge(queued).await
    }

    async fn release(&mut self, queued: &QueuedEvent) -> EventPublishResult<()> {
        (**self).release(queued).await
    }
}

/// Errors returned by event queues.
#[derive(Debug, Clone, Error)]
pub enum EventPublishError {
    /// The queue no longer accepts events, for example after shutdown.
    #[error("event queue closed")]
    Closed,

    /// The queue rejected the event.
    #[error("event queue error: {0}")]
    Queue(Arc<dyn std::error::Error + Send + Sync>),
}

impl EventPublishError {
    /// Wraps a queue error.
    pub fn queue(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Queue(Arc::new(err))
    }
}
