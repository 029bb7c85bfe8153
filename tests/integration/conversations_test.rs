//! Integration tests for direct conversations.

use http::StatusCode;
use serde_json::json;

use crate::helpers::{TestApp, TestUser, test_config};

async fn open_conversation(app: &TestApp, from: &TestUser, to: &TestUser) -> String {
    let response = app
        .request(
            "POST",
            "/api/conversations",
            Some(json!({ "otherUserId": to.id })),
            Some(&from.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    response.str("/id")
}

#[tokio::test]
async fn test_conversation_is_shared_by_both_sides() {
    let app = TestApp::new();
    let alice = app.register("Alice").await;
    let bob = app.register("Bob").await;

    let first = open_conversation(&app, &alice, &bob).await;
    let second = open_conversation(&app, &bob, &alice).await;
    assert_eq!(first, second);

    let listed = app
        .request("GET", "/api/conversations", None, Some(&bob.token))
        .await;
    assert_eq!(listed.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_cannot_talk_to_yourself_or_nobody() {
    let app = TestApp::new();
    let alice = app.register("Alice").await;

    let myself = app
        .request(
            "POST",
            "/api/conversations",
            Some(json!({ "otherUserId": alice.id })),
            Some(&alice.token),
        )
        .await;
    assert_eq!(myself.status, StatusCode::BAD_REQUEST);

    let nobody = app
        .request(
            "POST",
            "/api/conversations",
            Some(json!({ "otherUserId": uuid::Uuid::new_v4() })),
            Some(&alice.token),
        )
        .await;
    assert_eq!(nobody.status, StatusCode::NOT_FOUND);
    assert_eq!(nobody.str("/message"), "User not found");
}

#[tokio::test]
async fn test_post_message_and_read_history() {
    let app = TestApp::new();
    let alice = app.register("Alice").await;
    let bob = app.register("Bob").await;
    let id = open_conversation(&app, &alice, &bob).await;

    for content in ["first", "second"] {
        let sent = app
            .request(
                "POST",
                &format!("/api/conversations/{}/messages", id),
                Some(json!({ "content": content })),
                Some(&alice.token),
            )
            .await;
        assert_eq!(sent.status, StatusCode::CREATED);
        assert_eq!(sent.str("/conversation"), id);
        assert_eq!(sent.str("/sender/id"), alice.id);
    }

    let history = app
        .request(
            "GET",
            &format!("/api/conversations/{}/messages", id),
            None,
            Some(&bob.token),
        )
        .await;
    assert_eq!(history.status, StatusCode::OK);
    let contents: Vec<&str> = history
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, ["first", "second"]);

    let detail = app
        .request(
            "GET",
            &format!("/api/conversations/{}", id),
            None,
            Some(&bob.token),
        )
        .await;
    assert_eq!(detail.str("/lastMessage/content"), "second");
}

#[tokio::test]
async fn test_blank_message_rejected() {
    let app = TestApp::new();
    let alice = app.register("Alice").await;
    let bob = app.register("Bob").await;
    let id = open_conversation(&app, &alice, &bob).await;

    let response = app
        .request(
            "POST",
            &format!("/api/conversations/{}/messages", id),
            Some(json!({ "content": "   " })),
            Some(&alice.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.str("/message"), "Message content is required");
}

#[tokio::test]
async fn test_outsider_is_forbidden() {
    let app = TestApp::new();
    let alice = app.register("Alice").await;
    let bob = app.register("Bob").await;
    let eve = app.register("Eve").await;
    let id = open_conversation(&app, &alice, &bob).await;

    for (method, path, body) in [
        ("GET", format!("/api/conversations/{}", id), None),
        ("GET", format!("/api/conversations/{}/messages", id), None),
        (
            "POST",
            format!("/api/conversations/{}/messages", id),
            Some(json!({ "content": "let me in" })),
        ),
        ("DELETE", format!("/api/conversations/{}", id), None),
    ] {
        let response = app.request(method, &path, body, Some(&eve.token)).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "{} {}", method, path);
    }
}

#[tokio::test]
async fn test_outsider_cannot_post_with_open_subscriptions() {
    let mut config = test_config();
    config.realtime.authorize_subscriptions = false;
    let app = TestApp::with_config(config);
    let alice = app.register("Alice").await;
    let bob = app.register("Bob").await;
    let eve = app.register("Eve").await;
    let id = open_conversation(&app, &alice, &bob).await;
    let path = format!("/api/conversations/{}/messages", id);

    let denied = app
        .request("POST", &path, Some(json!({ "content": "let me in" })), Some(&eve.token))
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let sent = app
        .request("POST", &path, Some(json!({ "content": "hi Bob" })), Some(&alice.token))
        .await;
    assert_eq!(sent.status, StatusCode::CREATED);

    let history = app.request("GET", &path, None, Some(&bob.token)).await;
    assert_eq!(history.body.as_array().map(Vec::len), Some(1));
    assert_eq!(history.str("/0/content"), "hi Bob");
}

#[tokio::test]
async fn test_participant_deletes_conversation() {
    let app = TestApp::new();
    let alice = app.register("Alice").await;
    let bob = app.register("Bob").await;
    let id = open_conversation(&app, &alice, &bob).await;

    let deleted = app
        .request(
            "DELETE",
            &format!("/api/conversations/{}", id),
            None,
            Some(&bob.token),
        )
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.str("/message"), "Conversation deleted successfully");

    let gone = app
        .request(
            "GET",
            &format!("/api/conversations/{}", id),
            None,
            Some(&alice.token),
        )
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}
