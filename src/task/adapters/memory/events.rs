//! Event publisher that keeps every published event in memory.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::task::{
    domain::TaskLifecycleEvent,
    ports::{EventPublishError, EventPublishResult, EventPublisher},
};

/// Records published events for later inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingEventPublisher {
    events: Arc<Mutex<Vec<TaskLifecycleEvent>>>,
}

impl RecordingEventPublisher {
    /// Creates an empty publisher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the events published so far, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<TaskLifecycleEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl EventPublisher for RecordingEventPublisher {
    async fn publish(&self, event: TaskLifecycleEvent) -> EventPublishResult<()> {
        let mut events = self
            .events
            .lock()
            .map_err(|err| EventPublishError::queue(std::io::Error::other(err.to_string())))?;
        events.push(event);
        Ok(())
    }
}
