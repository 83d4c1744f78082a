//! In-memory identity adapters.

mod token;
mod user;

pub use token::InMemoryAccessTokenRepository;
pub use user::InMemoryUserRepository;
