/// Router tests for health and authentication endpoints
///
/// The router is driven as a `tower::Service` over the in-memory store.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Duration;
use common::{Session, TestContext, JWT_SECRET};
use serde_json::json;
use taskdesk_shared::auth::jwt::{create_token, Claims};
use taskdesk_shared::models::user::Role;

#[tokio::test]
async fn test_health_reports_store() {
    let ctx = TestContext::new();

    let (status, body) = ctx.send("GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_register_returns_public_profile() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .send(
            "POST",
            "/auth/register",
            None,
            Some(json!({
                "name": "Ada Lovelace",
                "email": " Ada@Example.com ",
                "password": "secret1"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert_eq!(body["user"]["role"], "user");
    assert!(body["user"].get("passwordHash").is_none());
    assert!(body.get("token").is_none());
}

#[tokio::test]
async fn test_register_validation_errors() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .send(
            "POST",
            "/auth/register",
            None,
            Some(json!({ "name": "Ada Lovelace", "email": "ada@example.com", "password": "12345" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"][0]["field"], "password");
    assert_eq!(
        body["details"][0]["message"],
        "Password must be at least 6 characters long"
    );
}

#[tokio::test]
async fn test_register_overlong_email_is_bad_request() {
    let ctx = TestContext::new();
    let email = format!("{}@example.com", "a".repeat(300));

    let (status, body) = ctx
        .send(
            "POST",
            "/auth/register",
            None,
            Some(json!({ "name": "Ada Lovelace", "email": email, "password": "secret1" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"][0]["field"], "email");
    assert_eq!(body["details"][0]["message"], "Email must be at most 255 characters");
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let ctx = TestContext::new();
    ctx.user("Bob").await;

    let (status, body) = ctx
        .send(
            "POST",
            "/auth/register",
            None,
            Some(json!({ "name": "Other Bob", "email": "BOB@example.com", "password": "secret1" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "conflict");
    assert_eq!(body["message"], "Email already exists");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("content-type", "application/json")
        .body(Body::from("{\"email\": "))
        .unwrap();
    let (status, body) = ctx.send_request(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_login_failures_are_identical() {
    let ctx = TestContext::new();
    ctx.user("Bob").await;

    let (wrong_status, wrong_body) = ctx
        .send(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": "bob@example.com", "password": "wrong-password" })),
        )
        .await;
    let (unknown_status, unknown_body) = ctx
        .send(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": "nobody@example.com", "password": "secret1" })),
        )
        .await;

    assert_eq!(wrong_status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_body["message"], "Invalid credentials");
    assert_eq!(unknown_status, wrong_status);
    assert_eq!(unknown_body, wrong_body);
}

#[tokio::test]
async fn test_login_token_grants_access() {
    let ctx = TestContext::new();
    let bob = ctx.user("Bob").await;

    let (status, body) = ctx.send("GET", "/tasks/summary", Some(&bob), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_list_users_requires_admin() {
    let ctx = TestContext::new();
    let admin = ctx.admin().await;
    let bob = ctx.user("Bob").await;
    ctx.user("Carol").await;

    let (status, body) = ctx.send("GET", "/auth/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, body) = ctx.send("GET", "/auth/users", Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, body) = ctx.send("GET", "/auth/users", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let emails: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["email"].as_str().unwrap())
        .collect();
    assert_eq!(emails, vec!["bob@example.com", "carol@example.com"]);
}

#[tokio::test]
async fn test_admin_registration_can_be_disabled() {
    let ctx = TestContext::with_env(&[("ALLOW_ADMIN_REGISTRATION", "false")]);
    let wannabe = ctx.sign_up("Wannabe Admin", "wannabe@example.com", "admin").await;

    let (status, _) = ctx.send("GET", "/auth/users", Some(&wannabe), None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_bad_tokens_are_unauthorized() {
    let ctx = TestContext::new();

    let expired = Session {
        id: 1,
        token: create_token(&Claims::new(1, Role::Admin, Duration::hours(-2)), JWT_SECRET).unwrap(),
    };
    let forged = Session {
        id: 1,
        token: create_token(
            &Claims::new(1, Role::Admin, Duration::hours(1)),
            "some-other-secret-that-is-32-bytes-long",
        )
        .unwrap(),
    };
    let garbage = Session {
        id: 1,
        token: "not.a.jwt".to_string(),
    };

    for session in [&expired, &forged, &garbage] {
        let (status, body) = ctx.send("GET", "/tasks", Some(session), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "unauthorized");
    }

    let request = Request::builder()
        .uri("/tasks")
        .header("authorization", "Basic YWRtaW46YWRtaW4=")
        .body(Body::empty())
        .unwrap();
    let (status, _) = ctx.send_request(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_security_headers_on_every_response() {
    let ctx = TestContext::new();

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = tower::ServiceExt::oneshot(ctx.app.clone(), request).await.unwrap();

    assert_eq!(response.headers().get("x-content-type-options").unwrap(), "nosniff");
    assert!(response.headers().get("strict-transport-security").is_none());
}
