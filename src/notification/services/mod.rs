//! Notification delivery services.

mod dispatcher;

pub use dispatcher::{NotificationDispatcher, NotificationError, RetryPolicy};
