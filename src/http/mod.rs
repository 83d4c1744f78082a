//! JSON HTTP interface.
//!
//! Every task route and `/logout`, `/me` require an
//! `Authorization: Bearer <token>` header. The authenticated actor is passed
//! explicitly into the services.

mod auth;
mod dto;
mod error;
mod handlers;
mod state;

pub use auth::{AuthenticatedUser, BearerToken};
pub use dto::{BoardResponse, Data, TaskOwnerResponse, TaskResponse, UserResponse};
pub use error::ApiError;
pub use state::AppState;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

/// Builds the application router.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/me", get(handlers::me))
        .route("/tasks", get(handlers::list_tasks).post(handlers::create_task))
        .route("/tasks/board", get(handlers::board))
        .route(
            "/tasks/{id}",
            get(handlers::show_task)
                .put(handlers::update_task)
                .delete(handlers::delete_task),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
