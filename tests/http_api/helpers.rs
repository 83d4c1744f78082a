//! Shared helpers for driving the router in-process.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use rstest::fixture;
use serde_json::{Value, json};
use taskboard::{
    app::{self, Components, Repositories},
    config::{AdminBootstrap, AppConfig},
    http::{self, AppState},
    notification::adapters::RecordingMailer,
};
use tower::ServiceExt;

/// Router over in-memory components.
pub struct TestApi {
    router: Router,
    pub components: Components,
}

/// Provides a fresh API for each test.
#[fixture]
pub fn api() -> TestApi {
    let components = Components::build(
        &AppConfig::default(),
        Repositories::in_memory(),
        Arc::new(RecordingMailer::new()),
    );
    let router = http::router(AppState::from(&components));
    TestApi { router, components }
}

impl TestApi {
    /// Sends one request and returns the status with the parsed JSON body.
    ///
    /// Empty bodies are returned as [`Value::Null`].
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(bearer) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {bearer}"));
        }
        let payload = body.map(|json_body| json_body.to_string());
        if payload.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        let request = builder
            .body(payload.map_or_else(Body::empty, Body::from))
            .expect("request should build");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body should be readable")
            .to_bytes();
        let parsed = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("body should be JSON")
        };
        (status, parsed)
    }

    /// Sends a raw, possibly malformed, JSON body.
    pub async fn send_raw(&self, uri: &str, token: &str, raw: &'static str) -> StatusCode {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(raw))
            .expect("request should build");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
            .status()
    }

    /// Registers a standard user over HTTP.
    pub async fn register(&self, name: &str) -> Value {
        let (status, body) = self
            .send(
                Method::POST,
                "/register",
                None,
                Some(json!({
                    "name": name,
                    "email": email_for(name),
                    "password": "password123",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "registration failed: {body}");
        body
    }

    /// Logs in over HTTP and returns the bearer token.
    pub async fn login(&self, name: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/login",
                None,
                Some(json!({ "email": email_for(name), "password": "password123" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"]
            .as_str()
            .expect("token should be a string")
            .to_owned()
    }

    /// Registers and logs in a standard user.
    pub async fn standard_user(&self, name: &str) -> String {
        self.register(name).await;
        self.login(name).await
    }

    /// Bootstraps an admin account and logs it in.
    pub async fn admin_user(&self, name: &str) -> String {
        let admin = AdminBootstrap {
            name: name.to_owned(),
            email: email_for(name),
            password: "password123".to_owned(),
        };
        app::ensure_admin(
            &self.components.auth,
            self.components.users.as_ref(),
            &admin,
        )
        .await
        .expect("admin bootstrap");
        self.login(name).await
    }

    /// Creates a task and returns its identifier.
    pub async fn create_task(&self, token: &str, title: &str, status: &str) -> String {
        let (code, body) = self
            .send(
                Method::POST,
                "/tasks",
                Some(token),
                Some(json!({
                    "title": title,
                    "description": format!("{title} description"),
                    "status": status,
                })),
            )
            .await;
        assert_eq!(code, StatusCode::CREATED, "task creation failed: {body}");
        body["data"]["id"]
            .as_str()
            .expect("task id should be a string")
            .to_owned()
    }
}

/// Returns the email used for a named test user.
#[must_use]
pub fn email_for(name: &str) -> String {
    format!("{}@example.com", name.to_lowercase())
}
