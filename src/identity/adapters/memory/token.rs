//! In-memory access token repository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::identity::{
    domain::{AccessTokenRecord, TokenDigest, UserId},
    ports::{AccessTokenRepository, UserRepositoryError, UserRepositoryResult},
};

/// Thread-safe in-memory access token repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccessTokenRepository {
    tokens: Arc<RwLock<HashMap<TokenDigest, AccessTokenRecord>>>,
}

impl InMemoryAccessTokenRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl std::fmt::Display) -> UserRepositoryError {
    UserRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl AccessTokenRepository for InMemoryAccessTokenRepository {
    async fn store(&self, record: &AccessTokenRecord) -> UserRepositoryResult<()> {
        let mut tokens = self.tokens.write().map_err(lock_error)?;
        tokens.insert(record.digest().clone(), record.clone());
        Ok(())
    }

    async fn find_user_id(&self, digest: &TokenDigest) -> UserRepositoryResult<Option<UserId>> {
        let tokens = self.tokens.read().map_err(lock_error)?;
        Ok(tokens.get(digest).map(AccessTokenRecord::user_id))
    }

    async fn revoke(&self, digest: &TokenDigest) -> UserRepositoryResult<()> {
        let mut tokens = self.tokens.write().map_err(lock_error)?;
        tokens.remove(digest);
        Ok(())
    }
}
