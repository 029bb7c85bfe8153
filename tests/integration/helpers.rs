//! Shared test helpers for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use futures::{SinkExt, StreamExt};
use http::{Request, StatusCode};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tower::ServiceExt;

use chathub_api::{AppState, build_app};
use chathub_core::config::AppConfig;
use chathub_database::MemoryStore;

/// Client side of a live socket.
pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for inspecting the real-time engine
    pub state: AppState,
    /// Backing store, for simulating outages
    pub store: Arc<MemoryStore>,
}

/// A registered account
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: String,
    pub email: String,
    pub token: String,
}

/// Config for tests: in-memory store and a fixed signing secret.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.database.provider = "memory".to_string();
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config.realtime.require_token = true;
    config.realtime.authorize_subscriptions = true;
    config
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Create a test application with adjusted settings
    pub fn with_config(config: AppConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(config, store.clone());
        let router = build_app(state.clone());
        Self {
            router,
            state,
            store,
        }
    }

    /// Register an account and return its id and token
    pub async fn register(&self, first_name: &str) -> TestUser {
        let email = format!("{}@example.com", first_name.to_lowercase());
        let response = self
            .request(
                "POST",
                "/api/users/register",
                Some(serde_json::json!({
                    "firstName": first_name,
                    "lastName": "Tester",
                    "email": email,
                    "password": "secret123",
                })),
                None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Registration failed: {:?}",
            response.body
        );

        TestUser {
            id: response.str("/user/id"),
            email,
            token: response.str("/token"),
        }
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Serve the app on an ephemeral port
    pub async fn serve(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("No local address");
        let router = self.router.clone();
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        addr
    }

    /// Open a socket as `user` and announce them
    pub async fn connect_as(&self, addr: SocketAddr, user: &TestUser) -> WsClient {
        let url = format!("ws://{}/ws?token={}", addr, user.token);
        let (mut ws, _) = tokio_tungstenite::connect_async(url)
            .await
            .expect("WebSocket connect failed");
        send_event(&mut ws, "join", serde_json::json!({ "userId": user.id })).await;
        ws
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// String at a JSON pointer, panicking when absent
    pub fn str(&self, pointer: &str) -> String {
        self.body
            .pointer(pointer)
            .and_then(Value::as_str)
            .unwrap_or_else(|| panic!("No string at {} in {:?}", pointer, self.body))
            .to_string()
    }
}

/// Send one `{"event", "data"}` frame
pub async fn send_event(ws: &mut WsClient, event: &str, data: Value) {
    let frame = serde_json::json!({ "event": event, "data": data }).to_string();
    ws.send(Message::Text(frame.into()))
        .await
        .expect("Failed to send frame");
}

/// Next JSON event, skipping control frames
pub async fn next_event(ws: &mut WsClient) -> Value {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    return serde_json::from_str::<Value>(text.as_str())
                        .expect("Server sent invalid JSON");
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                other => panic!("Unexpected socket item: {:?}", other),
            }
        }
    })
    .await
    .expect("Timed out waiting for an event")
}

/// Asserts nothing but control frames arrive for `wait`
pub async fn expect_silence(ws: &mut WsClient, wait: Duration) {
    let deadline = tokio::time::sleep(wait);
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            _ = &mut deadline => return,
            item = ws.next() => match item {
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                other => panic!("Expected silence, got {:?}", other),
            },
        }
    }
}

/// Gives the server a moment to process frames that have no reply
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(150)).await;
}
