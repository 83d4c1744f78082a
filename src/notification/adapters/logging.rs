//! Mailer that writes messages to the tracing log instead of a transport.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::notification::{
    domain::OutgoingMail,
    ports::{Mailer, MailerResult},
};

/// Logs every message at `info` level with its body at `debug`.
#[derive(Debug, Clone)]
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    /// Creates a mailer that reports `from` as the sender address.
    #[must_use]
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: &OutgoingMail) -> MailerResult<()> {
        info!(from = %self.from, to = %mail.to, subject = %mail.subject, "mail sent");
        debug!(to = %mail.to, body = %mail.body, "mail body");
        Ok(())
    }
}
