//! Mail transport port.

use crate::notification::domain::OutgoingMail;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for mail delivery.
pub type MailerResult<T> = Result<T, MailerError>;

/// Delivers rendered mail.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends one message.
    ///
    /// # Errors
    ///
    /// Returns [`MailerError::Unavailable`] for failures worth retrying and
    /// [`MailerError::Rejected`] when the transport refuses the message.
    async fn send(&self, mail: &OutgoingMail) -> MailerResult<()>;
}

/// Errors returned by mail transports.
#[derive(Debug, Clone, Error)]
pub enum MailerError {
    /// The transport is temporarily unreachable.
    #[error("mail transport unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),

    /// The transport refused the message permanently.
    #[error("mail rejected: {0}")]
    Rejected(String),
}

impl MailerError {
    /// Wraps a transport error as temporarily unavailable.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }

    /// Returns `true` when a later attempt may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
