//! Integration tests for registration, login and profiles.

use http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_register_returns_token_and_user() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/users/register",
            Some(json!({
                "firstName": "Alice",
                "lastName": "Liddell",
                "email": "alice@example.com",
                "password": "secret123",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert!(!response.str("/token").is_empty());
    assert_eq!(response.str("/user/firstName"), "Alice");
    assert_eq!(response.str("/user/email"), "alice@example.com");
    assert!(response.body.pointer("/user/passwordHash").is_none());
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let app = TestApp::new();
    app.register("Alice").await;

    let response = app
        .request(
            "POST",
            "/api/users/register",
            Some(json!({
                "firstName": "Other",
                "lastName": "Alice",
                "email": "alice@example.com",
                "password": "secret123",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.str("/message"), "User already exists");
}

#[tokio::test]
async fn test_register_requires_valid_email() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/users/register",
            Some(json!({
                "firstName": "Alice",
                "lastName": "Liddell",
                "email": "not-an-email",
                "password": "secret123",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.str("/error"), "VALIDATION_ERROR");
    assert_eq!(response.str("/message"), "A valid email is required");
}

#[tokio::test]
async fn test_login_round_trip() {
    let app = TestApp::new();
    let alice = app.register("Alice").await;

    let ok = app
        .request(
            "POST",
            "/api/users/login",
            Some(json!({ "email": alice.email, "password": "secret123" })),
            None,
        )
        .await;
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(ok.str("/user/id"), alice.id);

    let bad = app
        .request(
            "POST",
            "/api/users/login",
            Some(json!({ "email": alice.email, "password": "wrong-password" })),
            None,
        )
        .await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad.str("/message"), "Invalid credentials");
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = TestApp::new();

    let missing = app.request("GET", "/api/users/me", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.str("/message"), "No token, authorization denied");

    let garbage = app
        .request("GET", "/api/users/me", None, Some("not.a.jwt"))
        .await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
    assert_eq!(garbage.str("/message"), "Token is not valid");
}

#[tokio::test]
async fn test_update_profile() {
    let app = TestApp::new();
    let alice = app.register("Alice").await;

    let response = app
        .request(
            "PUT",
            "/api/users/update",
            Some(json!({ "lastName": "Pleasance" })),
            Some(&alice.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.str("/message"), "Profile updated successfully");
    assert_eq!(response.str("/user/lastName"), "Pleasance");
    assert_eq!(response.str("/user/firstName"), "Alice");

    let me = app
        .request("GET", "/api/users/me", None, Some(&alice.token))
        .await;
    assert_eq!(me.str("/lastName"), "Pleasance");
}

#[tokio::test]
async fn test_user_list_excludes_caller_and_sorts() {
    let app = TestApp::new();
    let carol = app.register("Carol").await;
    app.register("Bob").await;
    app.register("Alice").await;

    let response = app
        .request(
            "GET",
            "/api/conversations/users/list",
            None,
            Some(&carol.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let names: Vec<&str> = response
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["firstName"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Alice", "Bob"]);
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new();

    let basic = app.request("GET", "/api/health", None, None).await;
    assert_eq!(basic.status, StatusCode::OK);
    assert_eq!(basic.str("/status"), "ok");

    let detailed = app.request("GET", "/api/health/detailed", None, None).await;
    assert_eq!(detailed.status, StatusCode::OK);
    assert_eq!(detailed.str("/database"), "memory");
    assert_eq!(detailed.body["databaseOk"], true);
    assert_eq!(detailed.body["realtime"]["sessions"], 0);

    app.store.set_unavailable(true);
    let degraded = app.request("GET", "/api/health/detailed", None, None).await;
    assert_eq!(degraded.str("/status"), "degraded");
}
