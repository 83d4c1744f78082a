//! Mapping from service errors to HTTP responses.

use crate::identity::services::IdentityServiceError;
use crate::task::{domain::ValidationErrors, services::TaskLifecycleError};
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{debug, error};

/// Error returned by handlers.
///
/// Server-side failures are logged with their cause and reported to the
/// client with a generic message.
#[derive(Debug)]
pub enum ApiError {
    /// Rejected fields (422).
    Validation(ValidationErrors),
    /// Missing, unknown, or revoked bearer token (401).
    Unauthenticated,
    /// Wrong email or password at login (401).
    InvalidCredentials,
    /// Policy denial (403).
    Forbidden,
    /// Unknown task (404).
    TaskNotFound,
    /// Unparseable request body (400).
    MalformedBody(String),
    /// Any other failure (500).
    Internal,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<ValidationErrors>,
}

impl ApiError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unauthenticated | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::TaskNotFound => StatusCode::NOT_FOUND,
            Self::MalformedBody(_) => StatusCode::BAD_REQUEST,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Summarizes validation errors as the first message plus a count of the rest.
fn summarize(errors: &ValidationErrors) -> String {
    let mut messages = errors.iter().flat_map(|(_, messages)| messages.iter());
    let Some(first) = messages.next() else {
        return "The given data was invalid.".to_owned();
    };
    match messages.count() {
        0 => first.clone(),
        1 => format!("{first} (and 1 more error)"),
        more => format!("{first} (and {more} more errors)"),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Validation(errors) => ErrorBody {
                message: summarize(&errors),
                errors: Some(errors),
            },
            Self::Unauthenticated => message("Unauthenticated."),
            Self::InvalidCredentials => message("Invalid credentials"),
            Self::Forbidden => message("This action is unauthorized."),
            Self::TaskNotFound => message("Task not found."),
            Self::MalformedBody(reason) => message(&reason),
            Self::Internal => message("Server Error"),
        };
        (status, Json(body)).into_response()
    }
}

fn message(text: &str) -> ErrorBody {
    ErrorBody {
        message: text.to_owned(),
        errors: None,
    }
}

impl From<TaskLifecycleError> for ApiError {
    fn from(err: TaskLifecycleError) -> Self {
        match err {
            TaskLifecycleError::Validation(errors) => Self::Validation(errors),
            TaskLifecycleError::Unauthorized => Self::Forbidden,
            TaskLifecycleError::NotFound(task_id) => {
                debug!(%task_id, "task not found");
                Self::TaskNotFound
            }
            TaskLifecycleError::Repository(source) => {
                error!(error = %source, "task repository failure");
                Self::Internal
            }
            TaskLifecycleError::Users(source) => {
                error!(error = %source, "user repository failure");
                Self::Internal
            }
        }
    }
}

impl From<IdentityServiceError> for ApiError {
    fn from(err: IdentityServiceError) -> Self {
        match err {
            IdentityServiceError::Validation(fields) => {
                let mut errors = ValidationErrors::new();
                for (field, messages) in fields {
                    for text in messages {
                        errors.push(field, text);
                    }
                }
                Self::Validation(errors)
            }
            IdentityServiceError::InvalidCredentials => Self::InvalidCredentials,
            IdentityServiceError::Unauthenticated => Self::Unauthenticated,
            IdentityServiceError::Repository(source) => {
                error!(error = %source, "identity repository failure");
                Self::Internal
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedBody(rejection.body_text())
    }
}
