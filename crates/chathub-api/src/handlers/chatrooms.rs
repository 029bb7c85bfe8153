//! Chat room handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use chathub_core::types::RoomId;
use chathub_entity::message::MessageView;
use chathub_entity::room::RoomDetail;

use crate::dto::request::{CreateRoomRequest, validate_body};
use crate::dto::response::MessageResponse;
use crate::error::ApiResult;
use crate::extractors::{AuthUser, parse_id};
use crate::state::AppState;

fn room_id(raw: &str) -> ApiResult<RoomId> {
    Ok(parse_id(raw, "chat room")?)
}

/// GET /api/chatrooms
pub async fn list(State(state): State<AppState>, _auth: AuthUser) -> ApiResult<Json<Vec<RoomDetail>>> {
    Ok(Json(state.room_service.list_rooms().await?))
}

/// POST /api/chatrooms
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateRoomRequest>,
) -> ApiResult<(StatusCode, Json<RoomDetail>)> {
    validate_body(&req)?;
    let room = state.room_service.create_room(&auth, &req.name).await?;
    Ok((StatusCode::CREATED, Json(room)))
}

/// GET /api/chatrooms/{id}
pub async fn get(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<RoomDetail>> {
    Ok(Json(state.room_service.get_room(room_id(&id)?).await?))
}

/// POST /api/chatrooms/{id}/join
pub async fn join(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<RoomDetail>> {
    Ok(Json(state.room_service.join_room(&auth, room_id(&id)?).await?))
}

/// POST /api/chatrooms/{id}/leave
pub async fn leave(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.room_service.leave_room(&auth, room_id(&id)?).await?;
    Ok(Json(MessageResponse::new("Left chat room successfully")))
}

/// DELETE /api/chatrooms/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.room_service.delete_room(&auth, room_id(&id)?).await?;
    Ok(Json(MessageResponse::new("Chat room deleted successfully")))
}

/// GET /api/chatrooms/{id}/messages
pub async fn messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<MessageView>>> {
    Ok(Json(state.room_service.messages(&auth, room_id(&id)?).await?))
}
