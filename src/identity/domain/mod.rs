//! Domain model for users, roles, and access tokens.

mod error;
mod ids;
mod password;
mod token;
mod user;

pub use error::{IdentityDomainError, ParseRoleError};
pub use ids::UserId;
pub use password::{MIN_PASSWORD_LENGTH, PasswordHash};
pub use token::{AccessTokenRecord, IssuedToken, TokenDigest};
pub use user::{Actor, EmailAddress, NewUser, PersistedUserData, Role, User, UserName};
