//! Mailer that keeps delivered messages in memory.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::notification::{
    domain::OutgoingMail,
    ports::{Mailer, MailerError, MailerResult},
};

/// Records delivered mail and can simulate a flaky transport.
#[derive(Debug, Clone, Default)]
pub struct RecordingMailer {
    state: Arc<Mutex<RecordingState>>,
}

#[derive(Debug, Default)]
struct RecordingState {
    sent: Vec<OutgoingMail>,
    attempts: usize,
    failures_remaining: usize,
}

impl RecordingMailer {
    /// Creates a mailer that accepts every message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mailer whose first `failures` sends report the transport as
    /// unavailable.
    #[must_use]
    pub fn failing_first(failures: usize) -> Self {
        let mailer = Self::default();
        if let Ok(mut state) = mailer.state.lock() {
            state.failures_remaining = failures;
        }
        mailer
    }

    /// Returns the delivered messages, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.state
            .lock()
            .map(|state| state.sent.clone())
            .unwrap_or_default()
    }

    /// Returns the number of send attempts, successful or not.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.state.lock().map(|state| state.attempts).unwrap_or(0)
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> MailerResult<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|err| MailerError::unavailable(std::io::Error::other(err.to_string())))?;
        state.attempts += 1;
        if state.failures_remaining > 0 {
            state.failures_remaining -= 1;
            return Err(MailerError::unavailable(std::io::Error::other(
                "simulated transport outage",
            )));
        }
        state.sent.push(mail.clone());
        Ok(())
    }
}
