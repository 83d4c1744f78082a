//! Registration, login, and bearer token resolution.

use crate::identity::{
    domain::{
        AccessTokenRecord, Actor, EmailAddress, IdentityDomainError, IssuedToken, NewUser,
        PasswordHash, Role, User, UserName,
    },
    ports::{AccessTokenRepository, UserRepository, UserRepositoryError},
};
use mockable::Clock;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Request payload for registering a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterUserRequest {
    name: String,
    email: String,
    password: String,
    role: Role,
}

impl RegisterUserRequest {
    /// Creates a request for a standard user.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            role: Role::Standard,
        }
    }

    /// Sets the role granted to the new user.
    #[must_use]
    pub const fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}

/// Successful login result.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Plaintext bearer token; shown to the client once.
    pub token: IssuedToken,
    /// The authenticated user.
    pub user: User,
}

/// Service-level errors for identity operations.
#[derive(Debug, Error)]
pub enum IdentityServiceError {
    /// One or more registration fields are invalid.
    #[error("registration validation failed")]
    Validation(BTreeMap<&'static str, Vec<String>>),
    /// Email or password did not match.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// The bearer token is unknown, revoked, or its user no longer exists.
    #[error("unauthenticated")]
    Unauthenticated,
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] UserRepositoryError),
}

/// Result type for identity service operations.
pub type IdentityServiceResult<T> = Result<T, IdentityServiceError>;

/// Registration and bearer authentication service.
pub struct AuthService<U, T, C>
where
    U: UserRepository + ?Sized,
    T: AccessTokenRepository + ?Sized,
    C: Clock + Send + Sync,
{
    users: Arc<U>,
    tokens: Arc<T>,
    clock: Arc<C>,
}

impl<U, T, C> Clone for AuthService<U, T, C>
where
    U: UserRepository + ?Sized,
    T: AccessTokenRepository + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            tokens: Arc::clone(&self.tokens),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<U, T, C> AuthService<U, T, C>
where
    U: UserRepository + ?Sized,
    T: AccessTokenRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new authentication service.
    #[must_use]
    pub const fn new(users: Arc<U>, tokens: Arc<T>, clock: Arc<C>) -> Self {
        Self {
            users,
            tokens,
            clock,
        }
    }

    /// Registers a new user.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityServiceError::Validation`] for invalid fields or an
    /// email already in use, and repository errors otherwise.
    pub async fn register(&self, request: RegisterUserRequest) -> IdentityServiceResult<User> {
        let mut errors: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
        let parsed_name = collect(UserName::new(request.name), &mut errors);
        let parsed_email = collect(EmailAddress::new(request.email), &mut errors);
        let parsed_hash = collect(PasswordHash::create(&request.password), &mut errors);

        if let Some(ref candidate) = parsed_email
            && self.users.find_by_email(candidate).await?.is_some()
        {
            push_taken_email(&mut errors);
        }

        let (Some(name), Some(email), Some(password_hash), true) =
            (parsed_name, parsed_email, parsed_hash, errors.is_empty())
        else {
            return Err(IdentityServiceError::Validation(errors));
        };

        let user = User::new(
            NewUser {
                name,
                email,
                password_hash,
                role: request.role,
            },
            &*self.clock,
        );
        match self.users.store(&user).await {
            Ok(()) => {}
            Err(UserRepositoryError::DuplicateEmail(_)) => {
                push_taken_email(&mut errors);
                return Err(IdentityServiceError::Validation(errors));
            }
            Err(other) => return Err(other.into()),
        }

        info!(user_id = %user.id(), role = %user.role(), "registered user");
        Ok(user)
    }

    /// Verifies credentials and issues a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityServiceError::InvalidCredentials`] when the email is
    /// unknown or the password does not match.
    pub async fn login(&self, email: &str, password: &str) -> IdentityServiceResult<LoginOutcome> {
        let Ok(email) = EmailAddress::new(email) else {
            return Err(IdentityServiceError::InvalidCredentials);
        };
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .filter(|user| user.password_hash().verify(password))
            .ok_or(IdentityServiceError::InvalidCredentials)?;

        let token = IssuedToken::generate();
        let record = AccessTokenRecord::new(&token, user.id(), &*self.clock);
        self.tokens.store(&record).await?;

        info!(user_id = %user.id(), "issued access token");
        Ok(LoginOutcome { token, user })
    }

    /// Resolves the user behind a presented bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityServiceError::Unauthenticated`] for unknown or
    /// revoked tokens.
    pub async fn authenticate(&self, token: &IssuedToken) -> IdentityServiceResult<User> {
        let user_id = self
            .tokens
            .find_user_id(&token.digest())
            .await?
            .ok_or(IdentityServiceError::Unauthenticated)?;
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(IdentityServiceError::Unauthenticated)
    }

    /// Reloads the user behind an authenticated actor.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityServiceError::Unauthenticated`] when the user has
    /// been removed since authentication.
    pub async fn me(&self, actor: Actor) -> IdentityServiceResult<User> {
        self.users
            .find_by_id(actor.id())
            .await?
            .ok_or(IdentityServiceError::Unauthenticated)
    }

    /// Revokes a bearer token.
    ///
    /// # Errors
    ///
    /// Returns repository errors when revocation fails.
    pub async fn logout(&self, token: &IssuedToken) -> IdentityServiceResult<()> {
        self.tokens.revoke(&token.digest()).await?;
        debug!("revoked access token");
        Ok(())
    }
}

fn collect<T>(
    result: Result<T, IdentityDomainError>,
    errors: &mut BTreeMap<&'static str, Vec<String>>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            errors.entry(err.field()).or_default().push(err.to_string());
            None
        }
    }
}

fn push_taken_email(errors: &mut BTreeMap<&'static str, Vec<String>>) {
    errors
        .entry("email")
        .or_default()
        .push("The email has already been taken.".to_owned());
}
