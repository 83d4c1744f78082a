//! User aggregate, role variant, and the actor handed to task services.

use super::{IdentityDomainError, ParseRoleError, PasswordHash, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_NAME_LENGTH: usize = 255;
const MAX_EMAIL_LENGTH: usize = 255;

/// Authorization role of a user.
///
/// Storage keeps the role as a nullable name; a missing role is a standard
/// user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// May modify and delete any task regardless of owner or status.
    Admin,
    /// May modify and delete only their own tasks that are not complete.
    #[default]
    #[serde(rename = "User")]
    Standard,
}

impl Role {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Standard => "User",
        }
    }

    /// Returns `true` for [`Role::Admin`].
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Resolves a nullable persisted role name.
    ///
    /// # Errors
    ///
    /// Returns [`ParseRoleError`] when a role name is present but unknown.
    pub fn from_persisted(value: Option<&str>) -> Result<Self, ParseRoleError> {
        value.map_or(Ok(Self::Standard), Self::try_from)
    }
}

impl TryFrom<&str> for Role {
    type Error = ParseRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::Standard),
            _ => Err(ParseRoleError(value.to_owned())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserName(String);

impl UserName {
    /// Creates a validated user name.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityDomainError::EmptyName`] or
    /// [`IdentityDomainError::NameTooLong`].
    pub fn new(value: impl Into<String>) -> Result<Self, IdentityDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(IdentityDomainError::EmptyName);
        }
        if trimmed.chars().count() > MAX_NAME_LENGTH {
            return Err(IdentityDomainError::NameTooLong {
                max: MAX_NAME_LENGTH,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lower-cased mailbox address, unique per user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated, normalized email address.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityDomainError::InvalidEmail`] unless the value has a
    /// single `@` separating non-empty local and domain parts, contains no
    /// whitespace, and fits the persisted column width.
    pub fn new(value: impl Into<String>) -> Result<Self, IdentityDomainError> {
        let raw = value.into();
        let normalized = raw.trim().to_lowercase();
        let mut parts = normalized.split('@');
        let local = parts.next().unwrap_or_default();
        let domain = parts.next().unwrap_or_default();
        let is_valid = !local.is_empty()
            && !domain.is_empty()
            && parts.next().is_none()
            && normalized.chars().count() <= MAX_EMAIL_LENGTH
            && !normalized.chars().any(char::is_whitespace);

        if !is_valid {
            return Err(IdentityDomainError::InvalidEmail(raw));
        }
        Ok(Self(normalized))
    }

    /// Returns the address as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated fields for registering a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Display name.
    pub name: UserName,
    /// Login email.
    pub email: EmailAddress,
    /// Salted password digest.
    pub password_hash: PasswordHash,
    /// Authorization role.
    pub role: Role,
}

/// User aggregate root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    name: UserName,
    email: EmailAddress,
    role: Role,
    password_hash: PasswordHash,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedUserData {
    /// Persisted user identifier.
    pub id: UserId,
    /// Persisted display name.
    pub name: UserName,
    /// Persisted email.
    pub email: EmailAddress,
    /// Persisted role.
    pub role: Role,
    /// Persisted password digest.
    pub password_hash: PasswordHash,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user with a fresh identifier.
    #[must_use]
    pub fn new(new_user: NewUser, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: UserId::new(),
            name: new_user.name,
            email: new_user.email,
            role: new_user.role,
            password_hash: new_user.password_hash,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a user from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedUserData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            email: data.email,
            role: data.role,
            password_hash: data.password_hash,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub const fn name(&self) -> &UserName {
        &self.name
    }

    /// Returns the login email.
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the authorization role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns the password digest.
    #[must_use]
    pub const fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the actor performing requests as this user.
    #[must_use]
    pub const fn actor(&self) -> Actor {
        Actor::new(self.id, self.role)
    }
}

/// The authenticated principal passed explicitly into task services and the
/// authorization policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Actor {
    id: UserId,
    role: Role,
}

impl Actor {
    /// Creates an actor.
    #[must_use]
    pub const fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    /// Returns the acting user's identifier.
    #[must_use]
    pub const fn id(self) -> UserId {
        self.id
    }

    /// Returns the acting user's role.
    #[must_use]
    pub const fn role(self) -> Role {
        self.role
    }

    /// Returns `true` when the actor holds [`Role::Admin`].
    #[must_use]
    pub const fn is_admin(self) -> bool {
        self.role.is_admin()
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        user.actor()
    }
}
