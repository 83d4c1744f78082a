//! In-process event queue over a `tokio` channel.
//!
//! The publisher half is handed to the lifecycle service; the receiver half is
//! drained by the notification dispatcher on its own task. Events live only
//! in memory, so pending events are lost when the process stops.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::error;

use crate::task::{
    domain::TaskLifecycleEvent,
    ports::{EventPublishError, EventPublishResult, EventPublisher, EventSource, QueuedEvent},
};

/// Creates a connected publisher and receiver pair.
#[must_use]
pub fn event_queue() -> (ChannelEventPublisher, EventReceiver) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (
        ChannelEventPublisher { sender },
        EventReceiver { receiver },
    )
}

/// Publisher half of the in-process event queue.
#[derive(Debug, Clone)]
pub struct ChannelEventPublisher {
    sender: mpsc::UnboundedSender<TaskLifecycleEvent>,
}

#[async_trait]
impl EventPublisher for ChannelEventPublisher {
    async fn publish(&self, event: TaskLifecycleEvent) -> EventPublishResult<()> {
        self.sender
            .send(event)
            .map_err(|_| EventPublishError::Closed)
    }
}

/// Receiver half of the in-process event queue.
#[derive(Debug)]
pub struct EventReceiver {
    receiver: mpsc::UnboundedReceiver<TaskLifecycleEvent>,
}

impl EventReceiver {
    /// Waits for the next event.
    ///
    /// Returns `None` once every publisher has been dropped and the queue is
    /// drained.
    pub async fn recv(&mut self) -> Option<TaskLifecycleEvent> {
        self.receiver.recv().await
    }
}

#[async_trait]
impl EventSource for EventReceiver {
    async fn next(&mut self) -> Option<QueuedEvent> {
        self.recv().await.map(QueuedEvent::in_process)
    }

    async fn acknowledge(&mut self, _queued: &QueuedEvent) -> EventPublishResult<()> {
        Ok(())
    }

    async fn release(&mut self, queued: &QueuedEvent) -> EventPublishResult<()> {
        let event = queued.event();
        error!(
            event = event.name(),
            task_id = %event.task().id(),
            "in-process queue cannot redeliver; notification dropped"
        );
        Ok(())
    }
}
