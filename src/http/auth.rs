//! Bearer token extraction.

use super::{error::ApiError, state::AppState};
use crate::identity::domain::{Actor, IssuedToken, User};
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

/// The raw bearer token presented with a request.
#[derive(Debug)]
pub struct BearerToken(pub IssuedToken);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthenticated)?;
        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(ApiError::Unauthenticated)?;
        Ok(Self(IssuedToken::from_presented(token)))
    }
}

/// The user resolved from a valid bearer token.
#[derive(Debug)]
pub struct AuthenticatedUser {
    /// Resolved user.
    pub user: User,
    /// Token used to authenticate.
    pub token: IssuedToken,
}

impl AuthenticatedUser {
    /// Returns the actor passed to services.
    #[must_use]
    pub const fn actor(&self) -> Actor {
        self.user.actor()
    }
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        let user = state.auth.authenticate(&token).await?;
        Ok(Self { user, token })
    }
}
