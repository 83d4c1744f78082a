//! Asynchronous consumer of task lifecycle events.

use crate::identity::{
    domain::UserId,
    ports::{UserRepository, UserRepositoryError},
};
use crate::notification::{
    domain::{NotificationKind, RenderError, render_notification},
    ports::{Mailer, MailerError},
};
use crate::task::{
    domain::{TaskId, TaskLifecycleEvent, TaskOwner},
    ports::EventSource,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Bounded exponential backoff for mail delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

impl RetryPolicy {
    /// Creates a policy allowing `max_attempts` sends (at least one) with
    /// `backoff` before the first retry, doubling each time after.
    #[must_use]
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Returns the maximum number of send attempts.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the delay to wait after failed attempt number `attempt`.
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.backoff.saturating_mul(1 << exponent)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(200))
    }
}

/// Errors raised while dispatching a single event.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The task owner no longer exists; the event is undeliverable.
    #[error("owner {owner} of task {task_id} not found")]
    OwnerNotFound {
        /// Task the event refers to.
        task_id: TaskId,
        /// Missing owner.
        owner: UserId,
    },
    /// The message could not be rendered.
    #[error(transparent)]
    Render(#[from] RenderError),
    /// Delivery failed after the given number of attempts.
    #[error("delivery failed after {attempts} attempt(s): {source}")]
    Delivery {
        /// Attempts made.
        attempts: u32,
        /// Last transport error.
        source: MailerError,
    },
    /// Owner lookup failed.
    #[error(transparent)]
    Lookup(#[from] UserRepositoryError),
}

impl NotificationError {
    /// Returns `true` when the failure came from infrastructure that may
    /// recover, as opposed to an undeliverable event.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Delivery { source, .. } => source.is_transient(),
            Self::Lookup(_) => true,
            Self::OwnerNotFound { .. } | Self::Render(_) => false,
        }
    }
}

/// Sends one email per lifecycle event to the task owner.
pub struct NotificationDispatcher<U, M>
where
    U: UserRepository + ?Sized,
    M: Mailer + ?Sized,
{
    users: Arc<U>,
    mailer: Arc<M>,
    retry: RetryPolicy,
}

impl<U, M> NotificationDispatcher<U, M>
where
    U: UserRepository + ?Sized,
    M: Mailer + ?Sized,
{
    /// Creates a dispatcher.
    #[must_use]
    pub const fn new(users: Arc<U>, mailer: Arc<M>, retry: RetryPolicy) -> Self {
        Self {
            users,
            mailer,
            retry,
        }
    }

    /// Drains `source` until it closes.
    ///
    /// Delivered and undeliverable events are acknowledged. Events that
    /// exhausted their retries on a transient failure are released back to
    /// the source, which redelivers them later if it has durable storage.
    /// Failures never stop the loop.
    pub async fn run<S>(&self, mut source: S)
    where
        S: EventSource,
    {
        info!("notification dispatcher started");
        while let Some(queued) = source.next().await {
            let event = queued.event();
            let settled = match self.dispatch(event).await {
                Ok(()) => source.acknowledge(&queued).await,
                Err(err) if err.is_transient() => {
                    warn!(
                        event = event.name(),
                        task_id = %event.task().id(),
                        error = %err,
                        "notification failed; releasing event"
                    );
                    source.release(&queued).await
                }
                Err(err @ NotificationError::OwnerNotFound { .. }) => {
                    warn!(event = event.name(), error = %err, "notification skipped");
                    source.acknowledge(&queued).await
                }
                Err(err) => {
                    error!(
                        event = event.name(),
                        task_id = %event.task().id(),
                        error = %err,
                        "notification dropped"
                    );
                    source.acknowledge(&queued).await
                }
            };
            if let Err(err) = settled {
                warn!(
                    event = event.name(),
                    task_id = %event.task().id(),
                    error = %err,
                    "failed to settle queued event"
                );
            }
        }
        info!("notification dispatcher stopped");
    }

    /// Delivers the notification for one event.
    ///
    /// Each attempt resolves the owner, renders, and sends. Attempts failing
    /// on a transient owner lookup or transport error are retried with
    /// exponential backoff.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::OwnerNotFound`] when the owner is gone,
    /// [`NotificationError::Lookup`] when the owner lookup keeps failing, and
    /// [`NotificationError::Delivery`] once retries are exhausted or the
    /// transport rejects the message.
    pub async fn dispatch(&self, event: &TaskLifecycleEvent) -> Result<(), NotificationError> {
        let kind = NotificationKind::for_event(event);
        let mut attempt = 1;
        loop {
            match self.attempt(kind, event, attempt).await {
                Ok(()) => return Ok(()),
                Err(err) if err.is_transient() && attempt < self.retry.max_attempts() => {
                    let delay = self.retry.delay_after(attempt);
                    warn!(
                        %kind,
                        task_id = %event.task().id(),
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "notification attempt failed; retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn attempt(
        &self,
        kind: NotificationKind,
        event: &TaskLifecycleEvent,
        attempt: u32,
    ) -> Result<(), NotificationError> {
        let task = event.task();
        let Some(owner) = self.users.find_by_id(task.owner()).await? else {
            return Err(NotificationError::OwnerNotFound {
                task_id: task.id(),
                owner: task.owner(),
            });
        };
        let mail = render_notification(kind, task, &TaskOwner::from(&owner))?;
        self.mailer
            .send(&mail)
            .await
            .map_err(|source| NotificationError::Delivery {
                attempts: attempt,
                source,
            })?;
        debug!(%kind, to = %mail.to, attempt, "notification delivered");
        Ok(())
    }
}
