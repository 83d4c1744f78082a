//! Repository ports for user accounts and access tokens.

use crate::identity::domain::{AccessTokenRecord, EmailAddress, TokenDigest, User, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for identity repository operations.
pub type UserRepositoryResult<T> = Result<T, UserRepositoryError>;

/// User persistence contract.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stores a new user.
    ///
    /// # Errors
    ///
    /// Returns [`UserRepositoryError::DuplicateUser`] when the identifier
    /// already exists or [`UserRepositoryError::DuplicateEmail`] when another
    /// account uses the same email.
    async fn store(&self, user: &User) -> UserRepositoryResult<()>;

    /// Finds a user by identifier.
    async fn find_by_id(&self, id: UserId) -> UserRepositoryResult<Option<User>>;

    /// Finds a user by normalized email.
    async fn find_by_email(&self, email: &EmailAddress) -> UserRepositoryResult<Option<User>>;

    /// Returns the users among `ids` that exist, in no particular order.
    async fn find_many(&self, ids: &[UserId]) -> UserRepositoryResult<Vec<User>>;
}

/// Access token persistence contract.
#[async_trait]
pub trait AccessTokenRepository: Send + Sync {
    /// Stores an issued token digest.
    async fn store(&self, record: &AccessTokenRecord) -> UserRepositoryResult<()>;

    /// Resolves the user owning a token digest.
    ///
    /// Returns `None` for unknown or revoked tokens.
    async fn find_user_id(&self, digest: &TokenDigest) -> UserRepositoryResult<Option<UserId>>;

    /// Revokes a token digest. Revoking an unknown digest is not an error.
    async fn revoke(&self, digest: &TokenDigest) -> UserRepositoryResult<()>;
}

/// Errors returned by identity repository implementations.
#[derive(Debug, Clone, Error)]
pub enum UserRepositoryError {
    /// A user with the same identifier already exists.
    #[error("duplicate user identifier: {0}")]
    DuplicateUser(UserId),

    /// A user with the same email already exists.
    #[error("duplicate email: {0}")]
    DuplicateEmail(EmailAddress),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl UserRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
