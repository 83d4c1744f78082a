//! Registration, login, and bearer token handling over HTTP.

use axum::http::{Method, StatusCode};
use rstest::rstest;
use serde_json::json;
use taskboard::{
    app::{self, AppError},
    config::AdminBootstrap,
};

use super::helpers::{TestApi, api, email_for};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn health_needs_no_token(api: TestApi) {
    let (status, body) = api.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn register_returns_the_new_user(api: TestApi) {
    let body = api.register("Alice").await;
    assert_eq!(body["user"]["name"], "Alice");
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert_eq!(body["user"]["role"], "User");
    assert!(body["user"].get("password_hash").is_none());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn register_reports_field_errors(api: TestApi) {
    let (status, body) = api
        .send(
            Method::POST,
            "/register",
            None,
            Some(json!({ "name": "", "email": "nope", "password": "short" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["message"],
        "The email field must be a valid email address. (and 2 more errors)"
    );
    assert!(body["errors"]["name"].is_array());
    assert!(body["errors"]["password"].is_array());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn register_rejects_a_taken_email(api: TestApi) {
    api.register("Alice").await;
    let (status, body) = api
        .send(
            Method::POST,
            "/register",
            None,
            Some(json!({
                "name": "Impostor",
                "email": "alice@example.com",
                "password": "password123",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["email"][0], "The email has already been taken.");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn login_with_a_wrong_password_is_unauthorized(api: TestApi) {
    api.register("Alice").await;
    let (status, body) = api
        .send(
            Method::POST,
            "/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": "wrong-password" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn login_requires_both_fields(api: TestApi) {
    let (status, body) = api
        .send(Method::POST, "/login", None, Some(json!({})))
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["email"].is_array());
    assert!(body["errors"]["password"].is_array());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn me_returns_the_token_owner(api: TestApi) {
    let token = api.standard_user("Alice").await;
    let (status, body) = api.send(Method::GET, "/me", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "alice@example.com");
}

#[rstest]
#[case(None)]
#[case(Some("not-a-real-token"))]
#[tokio::test(flavor = "multi_thread")]
async fn protected_routes_reject_missing_or_unknown_tokens(
    api: TestApi,
    #[case] token: Option<&str>,
) {
    for (method, uri) in [
        (Method::GET, "/me"),
        (Method::GET, "/tasks"),
        (Method::GET, "/tasks/board"),
        (Method::POST, "/logout"),
    ] {
        let (status, body) = api.send(method, uri, token, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["message"], "Unauthenticated.");
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn logout_revokes_the_token(api: TestApi) {
    let token = api.standard_user("Alice").await;

    let (status, body) = api.send(Method::POST, "/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out");

    let (after, _) = api.send(Method::GET, "/me", Some(&token), None).await;
    assert_eq!(after, StatusCode::UNAUTHORIZED);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn bootstrapped_admin_logs_in_with_admin_role(api: TestApi) {
    let token = api.admin_user("Root").await;
    let (status, body) = api.send(Method::GET, "/me", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "Admin");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn admin_bootstrap_refuses_an_email_held_by_a_standard_user(api: TestApi) {
    api.register("Root").await;
    let admin = AdminBootstrap {
        name: "Root".to_owned(),
        email: email_for("Root"),
        password: "password123".to_owned(),
    };

    let result = app::ensure_admin(
        &api.components.auth,
        api.components.users.as_ref(),
        &admin,
    )
    .await;

    assert!(matches!(
        result,
        Err(AppError::AdminEmailTaken(email)) if email == "root@example.com"
    ));
    let token = api.login("Root").await;
    let (_, body) = api.send(Method::GET, "/me", Some(&token), None).await;
    assert_eq!(body["user"]["role"], "User");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn admin_bootstrap_reuses_an_existing_admin(api: TestApi) {
    api.admin_user("Root").await;
    let admin = AdminBootstrap {
        name: "Root".to_owned(),
        email: email_for("Root"),
        password: "password123".to_owned(),
    };

    let again = app::ensure_admin(
        &api.components.auth,
        api.components.users.as_ref(),
        &admin,
    )
    .await
    .expect("existing admin is accepted");

    assert!(again.role().is_admin());
}
