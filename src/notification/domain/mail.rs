//! Rendered notification messages.

use crate::task::domain::{Task, TaskLifecycleEvent, TaskOwner};
use minijinja::{Environment, context};
use std::fmt;
use thiserror::Error;

const CREATED_BODY: &str = "\
Hello {{ user_name }},

Task Created

Title: {{ title }}
Description: {{ description }}
Status: {{ status }}

Thank you,
Your Task Management App
";

const COMPLETED_BODY: &str = "\
Hello {{ user_name }},

Task Completed

Title: {{ title }}
Description: {{ description }}
Status: {{ status }}

Thank you,
Your Task Management App
";

/// Which lifecycle transition a notification announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// A task was created.
    Created,
    /// A task moved into the complete status.
    Completed,
}

impl NotificationKind {
    /// Returns the notification kind for `event`.
    #[must_use]
    pub const fn for_event(event: &TaskLifecycleEvent) -> Self {
        match event {
            TaskLifecycleEvent::Created(_) => Self::Created,
            TaskLifecycleEvent::Completed(_) => Self::Completed,
        }
    }

    /// Returns the subject line for a task titled `title`.
    #[must_use]
    pub fn subject(self, title: &str) -> String {
        match self {
            Self::Created => format!("New Task Created: {title}"),
            Self::Completed => format!("Task Completed: {title}"),
        }
    }

    const fn body_template(self) -> &'static str {
        match self {
            Self::Created => CREATED_BODY,
            Self::Completed => COMPLETED_BODY,
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => f.write_str("created"),
            Self::Completed => f.write_str("completed"),
        }
    }
}

/// A fully rendered email ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    /// Recipient address.
    pub to: String,
    /// Recipient display name.
    pub to_name: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

/// Error returned when a notification template fails to render.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to render {kind} notification: {reason}")]
pub struct RenderError {
    /// The notification being rendered.
    pub kind: NotificationKind,
    /// Renderer message.
    pub reason: String,
}

/// Renders the notification of `kind` about `task` for `owner`.
///
/// # Errors
///
/// Returns [`RenderError`] when the template engine rejects the template.
pub fn render_notification(
    kind: NotificationKind,
    task: &Task,
    owner: &TaskOwner,
) -> Result<OutgoingMail, RenderError> {
    let environment = Environment::new();
    let body = environment
        .render_str(
            kind.body_template(),
            context! {
                user_name => owner.name.as_str(),
                title => task.title().as_str(),
                description => task.description().as_str(),
                status => task.status().label(),
            },
        )
        .map_err(|error| RenderError {
            kind,
            reason: error.to_string(),
        })?;

    Ok(OutgoingMail {
        to: owner.email.clone(),
        to_name: owner.name.clone(),
        subject: kind.subject(task.title().as_str()),
        body,
    })
}
