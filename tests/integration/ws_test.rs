//! Integration tests for the live socket.

use std::time::Duration;

use http::StatusCode;
use serde_json::json;
use tokio_tungstenite::tungstenite;

use crate::helpers::{TestApp, expect_silence, next_event, send_event, settle};

#[tokio::test]
async fn test_upgrade_without_token_is_refused() {
    let app = TestApp::new();
    let addr = app.serve().await;

    for url in [
        format!("ws://{}/ws", addr),
        format!("ws://{}/ws?token=garbage", addr),
    ] {
        match tokio_tungstenite::connect_async(url).await {
            Err(tungstenite::Error::Http(response)) => {
                assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            }
            other => panic!("Expected an HTTP rejection, got {:?}", other.map(|_| ())),
        }
    }
}

#[tokio::test]
async fn test_room_message_reaches_every_subscriber() {
    let app = TestApp::new();
    let addr = app.serve().await;
    let alice = app.register("Alice").await;
    let bob = app.register("Bob").await;

    let room = app
        .request(
            "POST",
            "/api/chatrooms",
            Some(json!({ "name": "general" })),
            Some(&alice.token),
        )
        .await
        .str("/id");
    app.request(
        "POST",
        &format!("/api/chatrooms/{}/join", room),
        None,
        Some(&bob.token),
    )
    .await;

    let mut alice_ws = app.connect_as(addr, &alice).await;
    let mut bob_ws = app.connect_as(addr, &bob).await;
    send_event(&mut alice_ws, "joinRoom", json!(room)).await;
    send_event(&mut bob_ws, "joinRoom", json!(room)).await;
    settle().await;

    send_event(
        &mut alice_ws,
        "sendMessage",
        json!({ "roomId": room, "message": "hello room", "sender": alice.id }),
    )
    .await;

    for ws in [&mut alice_ws, &mut bob_ws] {
        let event = next_event(ws).await;
        assert_eq!(event["event"], "newMessage");
        assert_eq!(event["data"]["content"], "hello room");
        assert_eq!(event["data"]["chatRoom"], room.as_str());
        assert_eq!(event["data"]["sender"]["id"], alice.id.as_str());
    }

    let history = app
        .request(
            "GET",
            &format!("/api/chatrooms/{}/messages", room),
            None,
            Some(&bob.token),
        )
        .await;
    assert_eq!(history.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_rest_direct_message_is_pushed_once() {
    let app = TestApp::new();
    let addr = app.serve().await;
    let alice = app.register("Alice").await;
    let bob = app.register("Bob").await;

    let conversation = app
        .request(
            "POST",
            "/api/conversations",
            Some(json!({ "otherUserId": bob.id })),
            Some(&alice.token),
        )
        .await
        .str("/id");

    let mut bob_ws = app.connect_as(addr, &bob).await;
    send_event(&mut bob_ws, "joinConversation", json!(conversation)).await;
    settle().await;

    let sent = app
        .request(
            "POST",
            &format!("/api/conversations/{}/messages", conversation),
            Some(json!({ "content": "psst" })),
            Some(&alice.token),
        )
        .await;
    assert_eq!(sent.status, StatusCode::CREATED);

    let event = next_event(&mut bob_ws).await;
    assert_eq!(event["event"], "newMessage");
    assert_eq!(event["data"]["content"], "psst");
    assert_eq!(event["data"]["conversation"], conversation.as_str());
    expect_silence(&mut bob_ws, Duration::from_millis(200)).await;
}

#[tokio::test]
async fn test_join_as_someone_else_is_refused() {
    let app = TestApp::new();
    let addr = app.serve().await;
    let alice = app.register("Alice").await;
    let bob = app.register("Bob").await;

    let mut ws = app.connect_as(addr, &alice).await;
    send_event(&mut ws, "join", json!({ "userId": bob.id })).await;

    let event = next_event(&mut ws).await;
    assert_eq!(event["event"], "error");
    assert_eq!(event["data"]["code"], "AUTHORIZATION");
}

#[tokio::test]
async fn test_outsider_cannot_subscribe() {
    let app = TestApp::new();
    let addr = app.serve().await;
    let alice = app.register("Alice").await;
    let eve = app.register("Eve").await;

    let room = app
        .request(
            "POST",
            "/api/chatrooms",
            Some(json!({ "name": "private" })),
            Some(&alice.token),
        )
        .await
        .str("/id");

    let mut ws = app.connect_as(addr, &eve).await;
    send_event(&mut ws, "joinRoom", json!(room)).await;

    let event = next_event(&mut ws).await;
    assert_eq!(event["event"], "error");
    assert_eq!(event["data"]["code"], "AUTHORIZATION");
}

#[tokio::test]
async fn test_malformed_frame_keeps_session_open() {
    let app = TestApp::new();
    let addr = app.serve().await;
    let alice = app.register("Alice").await;

    let mut ws = app.connect_as(addr, &alice).await;
    send_event(&mut ws, "explode", json!(null)).await;

    let event = next_event(&mut ws).await;
    assert_eq!(event["event"], "error");
    assert_eq!(event["data"]["code"], "VALIDATION");

    // Still usable afterwards.
    send_event(&mut ws, "joinRoom", json!("not-a-uuid")).await;
    let event = next_event(&mut ws).await;
    assert_eq!(event["data"]["code"], "VALIDATION");
}

#[tokio::test]
async fn test_persistence_failure_reaches_only_sender() {
    let app = TestApp::new();
    let addr = app.serve().await;
    let alice = app.register("Alice").await;
    let bob = app.register("Bob").await;

    let room = app
        .request(
            "POST",
            "/api/chatrooms",
            Some(json!({ "name": "general" })),
            Some(&alice.token),
        )
        .await
        .str("/id");
    app.request(
        "POST",
        &format!("/api/chatrooms/{}/join", room),
        None,
        Some(&bob.token),
    )
    .await;

    let mut alice_ws = app.connect_as(addr, &alice).await;
    let mut bob_ws = app.connect_as(addr, &bob).await;
    send_event(&mut alice_ws, "joinRoom", json!(room)).await;
    send_event(&mut bob_ws, "joinRoom", json!(room)).await;
    settle().await;

    app.store.set_unavailable(true);
    send_event(
        &mut alice_ws,
        "sendMessage",
        json!({ "roomId": room, "message": "lost" }),
    )
    .await;

    let event = next_event(&mut alice_ws).await;
    assert_eq!(event["event"], "error");
    assert_eq!(event["data"]["message"], "Failed to send message");
    expect_silence(&mut bob_ws, Duration::from_millis(200)).await;
}

#[tokio::test]
async fn test_disconnect_clears_membership() {
    let app = TestApp::new();
    let addr = app.serve().await;
    let alice = app.register("Alice").await;

    let ws = app.connect_as(addr, &alice).await;
    settle().await;
    assert_eq!(app.state.realtime.stats().identified_users, 1);

    drop(ws);
    tokio::time::timeout(Duration::from_secs(5), async {
        while app.state.realtime.stats().sessions > 0 {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("Session was never cleaned up");
    assert_eq!(app.state.realtime.stats().identified_users, 0);
}
