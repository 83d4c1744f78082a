//! Shared handler state.

use crate::app::{Components, SharedAuthService, SharedTaskService};
use std::sync::Arc;

/// Services available to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Task lifecycle service.
    pub tasks: Arc<SharedTaskService>,
    /// Authentication service.
    pub auth: Arc<SharedAuthService>,
}

impl AppState {
    /// Creates state from wired services.
    #[must_use]
    pub const fn new(tasks: Arc<SharedTaskService>, auth: Arc<SharedAuthService>) -> Self {
        Self { tasks, auth }
    }
}

impl From<&Components> for AppState {
    fn from(components: &Components) -> Self {
        Self::new(
            Arc::clone(&components.tasks),
            Arc::clone(&components.auth),
        )
    }
}
