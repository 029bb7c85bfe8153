//! Route definitions for the ChatHub HTTP API.
//!
//! REST routes are grouped by resource and mounted under `/api`; the
//! real-time socket lives at `/ws`.

use axum::Router;
use axum::routing::{get, post, put};

use crate::handlers;
use crate::state::AppState;

/// Builds the router with every route bound to `state`.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(user_routes())
        .merge(chatroom_routes())
        .merge(conversation_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(handlers::ws::ws_handler))
        .with_state(state)
}

/// Registration, login and profile
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(handlers::users::register))
        .route("/users/login", post(handlers::users::login))
        .route("/users/me", get(handlers::users::me))
        .route("/users/update", put(handlers::users::update_profile))
}

/// Chat rooms and their history
fn chatroom_routes() -> Router<AppState> {
    use handlers::chatrooms;

    Router::new()
        .route("/chatrooms", get(chatrooms::list).post(chatrooms::create))
        .route("/chatrooms/{id}", get(chatrooms::get).delete(chatrooms::delete))
        .route("/chatrooms/{id}/join", post(chatrooms::join))
        .route("/chatrooms/{id}/leave", post(chatrooms::leave))
        .route("/chatrooms/{id}/messages", get(chatrooms::messages))
}

/// Direct conversations
fn conversation_routes() -> Router<AppState> {
    use handlers::conversations;

    Router::new()
        .route(
            "/conversations",
            get(conversations::list).post(conversations::get_or_create),
        )
        .route("/conversations/users/list", get(handlers::users::list_others))
        .route(
            "/conversations/{id}",
            get(conversations::get).delete(conversations::delete),
        )
        .route(
            "/conversations/{id}/messages",
            get(conversations::messages).post(conversations::send_message),
        )
}

/// Liveness and readiness
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}
