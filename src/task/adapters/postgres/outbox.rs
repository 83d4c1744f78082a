//! Durable lifecycle event queue kept in a `PostgreSQL` table.
//!
//! Publishing inserts a row. The dispatcher claims rows under a lease and
//! deletes each one once it has been handled. A claimed row that is never
//! acknowledged, for example because the process stopped mid-delivery,
//! becomes claimable again when its lease runs out.

use super::{
    models::{NewTaskEventRow, TaskEventRow},
    repository::TaskPgPool,
    schema::task_events,
};
use crate::task::{
    domain::TaskLifecycleEvent,
    ports::{EventPublishError, EventPublishResult, EventPublisher, EventSource, QueuedEvent},
};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use mockable::{Clock, DefaultClock};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, warn};

/// `PostgreSQL`-backed event queue.
#[derive(Debug, Clone)]
pub struct PostgresEventOutbox {
    pool: TaskPgPool,
}

impl PostgresEventOutbox {
    /// Creates an outbox over a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    /// Stores `event` and returns its sequence number.
    ///
    /// # Errors
    ///
    /// Returns [`EventPublishError::Queue`] when the event cannot be stored.
    pub async fn enqueue(&self, event: &TaskLifecycleEvent) -> EventPublishResult<i64> {
        let now = DefaultClock.utc();
        let row = NewTaskEventRow {
            payload: serde_json::to_value(event).map_err(EventPublishError::queue)?,
            available_at: now,
            created_at: now,
        };
        self.run_blocking(move |connection| {
            diesel::insert_into(task_events::table)
                .values(&row)
                .returning(task_events::id)
                .get_result(connection)
                .map_err(EventPublishError::queue)
        })
        .await
    }

    /// Claims up to `limit` available events, oldest first, hiding them from
    /// other claims for `lease`.
    ///
    /// Rows whose payload no longer decodes are logged and deleted.
    ///
    /// # Errors
    ///
    /// Returns [`EventPublishError::Queue`] when the claim fails.
    pub async fn claim(
        &self,
        limit: i64,
        lease: Duration,
    ) -> EventPublishResult<Vec<QueuedEvent>> {
        let now = DefaultClock.utc();
        let lease_until = later(now, lease);
        let rows = self
            .run_blocking(move |connection| {
                connection
                    .transaction::<_, diesel::result::Error, _>(|tx| {
                        let ids: Vec<i64> = task_events::table
                            .filter(task_events::available_at.le(now))
                            .order(task_events::id.asc())
                            .limit(limit)
                            .select(task_events::id)
                            .for_update()
                            .skip_locked()
                            .load(tx)?;
                        diesel::update(task_events::table.filter(task_events::id.eq_any(&ids)))
                            .set(task_events::available_at.eq(lease_until))
                            .returning(TaskEventRow::as_returning())
                            .get_results::<TaskEventRow>(tx)
                    })
                    .map_err(EventPublishError::queue)
            })
            .await?;

        let mut claimed = Vec::with_capacity(rows.len());
        for row in rows {
            match serde_json::from_value::<TaskLifecycleEvent>(row.payload) {
                Ok(event) => claimed.push(QueuedEvent::stored(row.id, event)),
                Err(err) => {
                    error!(sequence = row.id, error = %err, "discarding undecodable queued event");
                    self.acknowledge(row.id).await?;
                }
            }
        }
        claimed.sort_by_key(|queued| queued.sequence());
        Ok(claimed)
    }

    /// Deletes the event stored under `sequence`. Deleting a missing row is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns [`EventPublishError::Queue`] when the delete fails.
    pub async fn acknowledge(&self, sequence: i64) -> EventPublishResult<()> {
        self.run_blocking(move |connection| {
            diesel::delete(task_events::table.filter(task_events::id.eq(sequence)))
                .execute(connection)
                .map_err(EventPublishError::queue)?;
            Ok(())
        })
        .await
    }

    /// Makes the event stored under `sequence` claimable again after
    /// `delay`.
    ///
    /// # Errors
    ///
    /// Returns [`EventPublishError::Queue`] when the update fails.
    pub async fn release(&self, sequence: i64, delay: Duration) -> EventPublishResult<()> {
        let available_at = later(DefaultClock.utc(), delay);
        self.run_blocking(move |connection| {
            diesel::update(task_events::table.filter(task_events::id.eq(sequence)))
                .set(task_events::available_at.eq(available_at))
                .execute(connection)
                .map_err(EventPublishError::queue)?;
            Ok(())
        })
        .await
    }

    async fn run_blocking<F, T>(&self, f: F) -> EventPublishResult<T>
    where
        F: FnOnce(&mut PgConnection) -> EventPublishResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(EventPublishError::queue)?;
            f(&mut connection)
        })
        .await
        .map_err(EventPublishError::queue)?
    }
}

#[async_trait]
impl EventPublisher for PostgresEventOutbox {
    async fn publish(&self, event: TaskLifecycleEvent) -> EventPublishResult<()> {
        let sequence = self.enqueue(&event).await?;
        debug!(sequence, event = event.name(), task_id = %event.task().id(), "event queued");
        Ok(())
    }
}

/// Polling behaviour of an [`OutboxEventSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutboxSettings {
    /// Wait between polls of an empty queue.
    pub poll_interval: Duration,
    /// How long a claimed or released event stays hidden.
    pub lease: Duration,
    /// Maximum events claimed per poll.
    pub batch_size: i64,
}

impl Default for OutboxSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            lease: Duration::from_secs(60),
            batch_size: 32,
        }
    }
}

/// Event source that polls a [`PostgresEventOutbox`] until told to stop.
#[derive(Debug)]
pub struct OutboxEventSource {
    outbox: PostgresEventOutbox,
    settings: OutboxSettings,
    stop: watch::Receiver<bool>,
    pending: VecDeque<QueuedEvent>,
}

impl OutboxEventSource {
    /// Creates a source that stops once `stop` holds `true` or its sender is
    /// dropped. Events already claimed are still handed out.
    #[must_use]
    pub const fn new(
        outbox: PostgresEventOutbox,
        settings: OutboxSettings,
        stop: watch::Receiver<bool>,
    ) -> Self {
        Self {
            outbox,
            settings,
            stop,
            pending: VecDeque::new(),
        }
    }
}

#[async_trait]
impl EventSource for OutboxEventSource {
    async fn next(&mut self) -> Option<QueuedEvent> {
        loop {
            if let Some(queued) = self.pending.pop_front() {
                return Some(queued);
            }
            if *self.stop.borrow() {
                return None;
            }
            match self
                .outbox
                .claim(self.settings.batch_size, self.settings.lease)
                .await
            {
                Ok(batch) if !batch.is_empty() => {
                    self.pending.extend(batch);
                    continue;
                }
                Ok(_) => {}
                Err(err) => warn!(error = %err, "failed to claim queued events"),
            }
            tokio::select! {
                () = tokio::time::sleep(self.settings.poll_interval) => {}
                changed = self.stop.changed() => {
                    if changed.is_err() {
                        return None;
                    }
                }
            }
        }
    }

    async fn acknowledge(&mut self, queued: &QueuedEvent) -> EventPublishResult<()> {
        if let Some(sequence) = queued.sequence() {
            return self.outbox.acknowledge(sequence).await;
        }
        Ok(())
    }

    async fn release(&mut self, queued: &QueuedEvent) -> EventPublishResult<()> {
        if let Some(sequence) = queued.sequence() {
            return self.outbox.release(sequence, self.settings.lease).await;
        }
        Ok(())
    }
}

fn later(now: DateTime<Utc>, delay: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(delay)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
