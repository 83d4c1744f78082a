//! Taskboard: a multi-user task tracker.
//!
//! Users register, log in with bearer tokens, and manage tasks that move
//! through a fixed status lifecycle. Ownership and role decide who may change
//! what. Creating or completing a task sends the owner an email from a
//! background dispatcher.
//!
//! # Architecture
//!
//! Taskboard follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, cache, mail)
//!
//! # Modules
//!
//! - [`identity`]: Users, roles, passwords, and bearer tokens
//! - [`task`]: Task lifecycle, authorization policy, and cached listings
//! - [`notification`]: Email delivery for lifecycle events
//! - [`http`]: JSON API over the services
//! - [`app`], [`config`], [`telemetry`]: Process wiring

pub mod app;
pub mod config;
pub mod http;
pub mod identity;
pub mod notification;
pub mod task;
pub mod telemetry;
