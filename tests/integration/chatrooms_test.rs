//! Integration tests for chat rooms.

use http::StatusCode;
use serde_json::json;

use crate::helpers::{TestApp, TestUser};

async fn create_room(app: &TestApp, owner: &TestUser, name: &str) -> String {
    let response = app
        .request(
            "POST",
            "/api/chatrooms",
            Some(json!({ "name": name })),
            Some(&owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    response.str("/id")
}

#[tokio::test]
async fn test_create_and_list_rooms() {
    let app = TestApp::new();
    let alice = app.register("Alice").await;

    let id = create_room(&app, &alice, "general").await;

    let listed = app
        .request("GET", "/api/chatrooms", None, Some(&alice.token))
        .await;
    assert_eq!(listed.status, StatusCode::OK);
    let rooms = listed.body.as_array().unwrap();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0]["id"], id.as_str());
    assert_eq!(rooms[0]["creator"]["id"], alice.id.as_str());
    assert_eq!(rooms[0]["participants"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_blank_room_name_rejected() {
    let app = TestApp::new();
    let alice = app.register("Alice").await;

    let response = app
        .request(
            "POST",
            "/api/chatrooms",
            Some(json!({ "name": "" })),
            Some(&alice.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.str("/message"), "Chat room name is required");
}

#[tokio::test]
async fn test_join_and_leave() {
    let app = TestApp::new();
    let alice = app.register("Alice").await;
    let bob = app.register("Bob").await;
    let id = create_room(&app, &alice, "general").await;

    let joined = app
        .request(
            "POST",
            &format!("/api/chatrooms/{}/join", id),
            None,
            Some(&bob.token),
        )
        .await;
    assert_eq!(joined.status, StatusCode::OK);
    assert_eq!(joined.body["participants"].as_array().unwrap().len(), 2);

    // Joining twice changes nothing.
    let again = app
        .request(
            "POST",
            &format!("/api/chatrooms/{}/join", id),
            None,
            Some(&bob.token),
        )
        .await;
    assert_eq!(again.body["participants"].as_array().unwrap().len(), 2);

    let left = app
        .request(
            "POST",
            &format!("/api/chatrooms/{}/leave", id),
            None,
            Some(&bob.token),
        )
        .await;
    assert_eq!(left.status, StatusCode::OK);
    assert_eq!(left.str("/message"), "Left chat room successfully");

    let room = app
        .request("GET", &format!("/api/chatrooms/{}", id), None, Some(&bob.token))
        .await;
    assert_eq!(room.body["participants"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_history_is_for_participants() {
    let app = TestApp::new();
    let alice = app.register("Alice").await;
    let eve = app.register("Eve").await;
    let id = create_room(&app, &alice, "general").await;

    let own = app
        .request(
            "GET",
            &format!("/api/chatrooms/{}/messages", id),
            None,
            Some(&alice.token),
        )
        .await;
    assert_eq!(own.status, StatusCode::OK);
    assert_eq!(own.body, json!([]));

    let outsider = app
        .request(
            "GET",
            &format!("/api/chatrooms/{}/messages", id),
            None,
            Some(&eve.token),
        )
        .await;
    assert_eq!(outsider.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_only_creator_deletes() {
    let app = TestApp::new();
    let alice = app.register("Alice").await;
    let bob = app.register("Bob").await;
    let id = create_room(&app, &alice, "general").await;
    app.request(
        "POST",
        &format!("/api/chatrooms/{}/join", id),
        None,
        Some(&bob.token),
    )
    .await;

    let denied = app
        .request("DELETE", &format!("/api/chatrooms/{}", id), None, Some(&bob.token))
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let deleted = app
        .request(
            "DELETE",
            &format!("/api/chatrooms/{}", id),
            None,
            Some(&alice.token),
        )
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.str("/message"), "Chat room deleted successfully");

    let gone = app
        .request("GET", &format!("/api/chatrooms/{}", id), None, Some(&alice.token))
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bad_room_id_is_a_client_error() {
    let app = TestApp::new();
    let alice = app.register("Alice").await;

    let response = app
        .request("GET", "/api/chatrooms/not-a-uuid", None, Some(&alice.token))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.str("/message"), "Invalid chat room id: not-a-uuid");
}

#[tokio::test]
async fn test_store_outage_is_masked() {
    let app = TestApp::new();
    let alice = app.register("Alice").await;
    app.store.set_unavailable(true);

    let response = app
        .request("GET", "/api/chatrooms", None, Some(&alice.token))
        .await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.str("/message"), "Server error");
}
