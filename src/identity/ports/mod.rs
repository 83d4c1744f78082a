//! Port contracts for identity persistence.

pub mod repository;

pub use repository::{
    AccessTokenRepository, UserRepository, UserRepositoryError, UserRepositoryResult,
};
