//! Application services for registration and bearer authentication.

mod auth;

pub use auth::{
    AuthService, IdentityServiceError, IdentityServiceResult, LoginOutcome, RegisterUserRequest,
};
