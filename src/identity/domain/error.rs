//! Error types for identity domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing identity values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityDomainError {
    /// The user name is empty after trimming.
    #[error("The name field is required.")]
    EmptyName,

    /// The user name exceeds the persisted column width.
    #[error("The name field must not be greater than {max} characters.")]
    NameTooLong {
        /// Maximum permitted length in characters.
        max: usize,
    },

    /// The email address is not a plausible mailbox.
    #[error("The email field must be a valid email address.")]
    InvalidEmail(String),

    /// The password is shorter than the minimum length.
    #[error("The password field must be at least {min} characters.")]
    PasswordTooShort {
        /// Minimum permitted length in characters.
        min: usize,
    },

    /// The password could not be hashed.
    #[error("failed to hash password: {0}")]
    PasswordHashing(String),

    /// A persisted password hash is not a PHC string.
    #[error("malformed password hash")]
    MalformedPasswordHash,
}

impl IdentityDomainError {
    /// Returns the request field the error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyName | Self::NameTooLong { .. } => "name",
            Self::InvalidEmail(_) => "email",
            Self::PasswordTooShort { .. }
            | Self::PasswordHashing(_)
            | Self::MalformedPasswordHash => "password",
        }
    }
}

/// Error returned while parsing roles from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);
