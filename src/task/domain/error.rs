//! Error types for task domain validation and parsing.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Errors returned while constructing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The title is empty after trimming.
    #[error("The title field is required.")]
    EmptyTitle,

    /// The title exceeds the persisted column width.
    #[error("The title field must not be greater than {max} characters.")]
    TitleTooLong {
        /// Maximum permitted length in characters.
        max: usize,
    },

    /// The description is empty after trimming.
    #[error("The description field is required.")]
    EmptyDescription,

    /// The status is missing where it is required.
    #[error("The status field is required.")]
    MissingStatus,

    /// The status is not one of the lifecycle values.
    #[error("The selected status is invalid.")]
    InvalidStatus(String),
}

impl TaskDomainError {
    /// Returns the request field the error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyTitle | Self::TitleTooLong { .. } => "title",
            Self::EmptyDescription => "description",
            Self::MissingStatus | Self::InvalidStatus(_) => "status",
        }
    }
}

/// Error returned while parsing task statuses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

impl From<ParseTaskStatusError> for TaskDomainError {
    fn from(err: ParseTaskStatusError) -> Self {
        Self::InvalidStatus(err.0)
    }
}

/// Field-keyed validation messages for a rejected request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<&'static str, Vec<String>>);

impl ValidationErrors {
    /// Creates an empty set of validation errors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message against a field.
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    /// Records a domain error against its field.
    pub fn push_domain(&mut self, err: &TaskDomainError) {
        self.push(err.field(), err.to_string());
    }

    /// Returns `true` when no field has failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the messages recorded for `field`.
    #[must_use]
    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map_or(&[][..], Vec::as_slice)
    }

    /// Returns `true` when `field` has at least one message.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Iterates over fields and their messages.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[String])> {
        self.0.iter().map(|(field, messages)| (*field, messages.as_slice()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for messages in self.0.values() {
            for message in messages {
                if !first {
                    f.write_str(" ")?;
                }
                f.write_str(message)?;
                first = false;
            }
        }
        Ok(())
    }
}
