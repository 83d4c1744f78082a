//! Task lifecycle management for Taskboard.
//!
//! Tasks are created, revised, and deleted on behalf of an explicit
//! [`Actor`](crate::identity::domain::Actor). Every mutation passes the
//! authorization policy, invalidates the cached task listings it could have
//! made stale, and emits a lifecycle event for asynchronous notification.
//! The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
