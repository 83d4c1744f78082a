//! Port contracts for outbound mail.

mod mailer;

pub use mailer::{Mailer, MailerError, MailerResult};

#[cfg(test)]
pub use mailer::MockMailer;
