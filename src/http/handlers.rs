//! Route handlers.

use super::{
    auth::AuthenticatedUser,
    dto::{
        BoardResponse, CreateTaskBody, Data, LoginBody, LoginResponse, MessageResponse,
        RegisterBody, TaskResponse, UpdateTaskBody, UserEnvelope, UserResponse,
    },
    error::ApiError,
    state::AppState,
};
use crate::identity::services::RegisterUserRequest;
use crate::task::{
    domain::{TaskId, ValidationErrors},
    services::{CreateTaskRequest, UpdateTaskRequest},
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::{Value, json};
use uuid::Uuid;

type ApiResult<T> = Result<T, ApiError>;

#[expect(clippy::unused_async, reason = "axum handlers are async functions")]
pub(super) async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub(super) async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserEnvelope>)> {
    let Json(body) = payload?;
    let user = state
        .auth
        .register(RegisterUserRequest::new(body.name, body.email, body.password))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(UserEnvelope {
            user: UserResponse::from(&user),
        }),
    ))
}

pub(super) async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginBody>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(body) = payload?;
    let mut errors = ValidationErrors::new();
    if body.email.trim().is_empty() {
        errors.push("email", "The email field is required.");
    }
    if body.password.is_empty() {
        errors.push("password", "The password field is required.");
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let outcome = state.auth.login(&body.email, &body.password).await?;
    Ok(Json(LoginResponse {
        token: outcome.token.as_str().to_owned(),
        user: UserResponse::from(&outcome.user),
    }))
}

pub(super) async fn logout(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> ApiResult<Json<MessageResponse>> {
    state.auth.logout(&auth.token).await?;
    Ok(Json(MessageResponse {
        message: "Logged out",
    }))
}

pub(super) async fn me(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> ApiResult<Json<UserEnvelope>> {
    let user = state.auth.me(auth.actor()).await?;
    Ok(Json(UserEnvelope {
        user: UserResponse::from(&user),
    }))
}

pub(super) async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> ApiResult<Json<Data<Vec<TaskResponse>>>> {
    let tasks = state.tasks.list_visible(auth.actor()).await?;
    Ok(Json(Data::new(
        tasks.iter().map(TaskResponse::from).collect(),
    )))
}

pub(super) async fn board(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> ApiResult<Json<BoardResponse>> {
    let board = state.tasks.board(auth.actor()).await?;
    Ok(Json(BoardResponse::from(&board)))
}

pub(super) async fn show_task(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Data<TaskResponse>>> {
    let task = state.tasks.find(auth.actor(), parse_task_id(&id)?).await?;
    Ok(Json(Data::new(TaskResponse::from(&task))))
}

pub(super) async fn create_task(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    payload: Result<Json<CreateTaskBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Data<TaskResponse>>)> {
    let Json(body) = payload?;
    let mut request = CreateTaskRequest::new(body.title, body.description);
    if let Some(status) = body.status {
        request = request.with_status(status);
    }
    let task = state.tasks.create(auth.actor(), request).await?;
    Ok((
        StatusCode::CREATED,
        Json(Data::new(TaskResponse::from(&task))),
    ))
}

pub(super) async fn update_task(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTaskBody>, JsonRejection>,
) -> ApiResult<Json<Data<TaskResponse>>> {
    let task_id = parse_task_id(&id)?;
    let Json(body) = payload?;
    let mut request = UpdateTaskRequest::without_status(body.title, body.description);
    if let Some(status) = body.status {
        request = request.with_status(status);
    }
    let task = state.tasks.update(auth.actor(), task_id, request).await?;
    Ok(Json(Data::new(TaskResponse::from(&task))))
}

pub(super) async fn delete_task(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.tasks.delete(auth.actor(), parse_task_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Unparseable identifiers cannot name a task, so they read as not found.
fn parse_task_id(raw: &str) -> ApiResult<TaskId> {
    Uuid::parse_str(raw)
        .map(TaskId::from_uuid)
        .map_err(|_| ApiError::TaskNotFound)
}

