//! User identity, roles, and bearer credentials for Taskboard.
//!
//! Every task operation is performed on behalf of an authenticated actor.
//! This module owns the user records behind those actors, the closed
//! [`domain::Role`] variant that drives authorization, and the opaque access
//! tokens issued by the JSON API. The layout mirrors the task module:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
