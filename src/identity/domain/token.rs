//! Opaque bearer credentials for the JSON API.
//!
//! The plaintext token leaves the server exactly once, in the login response.
//! Only its SHA-256 digest is persisted, so a leaked token table cannot be
//! replayed against the API.

use super::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

/// Plaintext bearer token as issued to, or presented by, a client.
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedToken(String);

impl IssuedToken {
    /// Generates a new random token.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!(
            "{}{}",
            Uuid::new_v4().simple(),
            Uuid::new_v4().simple()
        ))
    }

    /// Wraps a token presented in an `Authorization` header.
    #[must_use]
    pub fn from_presented(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the plaintext token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the digest under which this token is stored.
    #[must_use]
    pub fn digest(&self) -> TokenDigest {
        TokenDigest::of(&self.0)
    }
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IssuedToken(<redacted>)")
    }
}

/// Hex-encoded SHA-256 digest of a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenDigest(String);

impl TokenDigest {
    /// Computes the digest of a plaintext token.
    #[must_use]
    pub fn of(token: &str) -> Self {
        Self(format!("{:x}", Sha256::digest(token.as_bytes())))
    }

    /// Wraps a digest loaded from storage.
    #[must_use]
    pub fn from_persisted(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the hex digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Stored access token row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessTokenRecord {
    digest: TokenDigest,
    user_id: UserId,
    created_at: DateTime<Utc>,
}

impl AccessTokenRecord {
    /// Creates a record for a freshly issued token.
    #[must_use]
    pub fn new(token: &IssuedToken, user_id: UserId, clock: &impl Clock) -> Self {
        Self {
            digest: token.digest(),
            user_id,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a record from storage.
    #[must_use]
    pub const fn from_persisted(
        digest: TokenDigest,
        user_id: UserId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            digest,
            user_id,
            created_at,
        }
    }

    /// Returns the token digest.
    #[must_use]
    pub const fn digest(&self) -> &TokenDigest {
        &self.digest
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the issue timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
