//! Notification domain types and rendering.

mod mail;

pub use mail::{NotificationKind, OutgoingMail, RenderError, render_notification};
