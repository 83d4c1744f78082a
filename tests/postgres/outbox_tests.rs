//! The durable lifecycle event queue against `PostgreSQL`.
//!
//! Claims see every queued row in the shared database, so the queue is
//! exercised from a single test to keep leases from interleaving.

use std::time::Duration;

use super::helpers::{new_task, new_user, pool};
use taskboard::{
    identity::domain::Role,
    task::{
        adapters::postgres::{OutboxEventSource, OutboxSettings, PostgresEventOutbox},
        domain::{TaskLifecycleEvent, TaskStatus},
        ports::{EventPublisher, EventSource, QueuedEvent},
    },
};
use tokio::sync::watch;

const CLAIM_ALL: i64 = 10_000;
const LEASE: Duration = Duration::from_secs(60);
const SOURCE_TIMEOUT: Duration = Duration::from_secs(10);

fn find(batch: &[QueuedEvent], sequence: i64) -> Option<&QueuedEvent> {
    batch
        .iter()
        .find(|queued| queued.sequence() == Some(sequence))
}

#[tokio::test(flavor = "multi_thread")]
async fn queued_events_stay_until_acknowledged() {
    let Some(pool) = pool() else { return };
    let outbox = PostgresEventOutbox::new(pool);
    let owner = new_user(Role::Standard);
    let task = new_task(&owner, TaskStatus::Incomplete);
    let event = TaskLifecycleEvent::Created(task.clone());
    let sequence = outbox.enqueue(&event).await.expect("enqueue");

    let first = outbox.claim(CLAIM_ALL, LEASE).await.expect("first claim");
    let claimed = find(&first, sequence).expect("stored event is claimable");
    assert_eq!(claimed.event().name(), "created");
    assert_eq!(claimed.event().task().id(), task.id());
    assert_eq!(claimed.event().task().title(), task.title());

    let leased = outbox.claim(CLAIM_ALL, LEASE).await.expect("leased claim");
    assert!(find(&leased, sequence).is_none());

    outbox
        .release(sequence, Duration::ZERO)
        .await
        .expect("release");
    let redelivered = outbox.claim(CLAIM_ALL, LEASE).await.expect("reclaim");
    assert!(find(&redelivered, sequence).is_some());

    outbox.acknowledge(sequence).await.expect("acknowledge");
    outbox
        .release(sequence, Duration::ZERO)
        .await
        .expect("releasing a deleted event is a no-op");
    let drained = outbox.claim(CLAIM_ALL, LEASE).await.expect("final claim");
    assert!(find(&drained, sequence).is_none());

    let (stop, stopped) = watch::channel(false);
    let settings = OutboxSettings {
        poll_interval: Duration::from_millis(20),
        ..OutboxSettings::default()
    };
    let mut source = OutboxEventSource::new(outbox.clone(), settings, stopped);
    let completed = TaskLifecycleEvent::Completed(task.clone());
    outbox.publish(completed).await.expect("publish");

    let delivered = tokio::time::timeout(SOURCE_TIMEOUT, async {
        loop {
            let queued = source.next().await.expect("source stays open");
            if queued.event().task().id() == task.id() {
                break queued;
            }
        }
    })
    .await
    .expect("published event reaches the source");
    assert_eq!(delivered.event().name(), "completed");
    source.acknowledge(&delivered).await.expect("acknowledge");

    stop.send_modify(|flag| *flag = true);
    tokio::time::timeout(SOURCE_TIMEOUT, async {
        while source.next().await.is_some() {}
    })
    .await
    .expect("source ends once stopped");
    let sequence_after = delivered.sequence().expect("stored events carry a sequence");
    let remaining = outbox.claim(CLAIM_ALL, LEASE).await.expect("claim");
    assert!(find(&remaining, sequence_after).is_none());
}
