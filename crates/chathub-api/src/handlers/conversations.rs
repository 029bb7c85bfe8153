//! Direct conversation handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use chathub_core::types::{ConversationId, UserId};
use chathub_entity::conversation::ConversationDetail;
use chathub_entity::message::MessageView;
use chathub_entity::topic::Topic;

use crate::dto::request::{CreateConversationRequest, SendMessageRequest, validate_body};
use crate::dto::response::MessageResponse;
use crate::error::ApiResult;
use crate::extractors::{AuthUser, parse_id};
use crate::state::AppState;

fn conversation_id(raw: &str) -> ApiResult<ConversationId> {
    Ok(parse_id(raw, "conversation")?)
}

/// GET /api/conversations
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<ConversationDetail>>> {
    Ok(Json(state.conversation_service.list(&auth).await?))
}

/// POST /api/conversations
pub async fn get_or_create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateConversationRequest>,
) -> ApiResult<Json<ConversationDetail>> {
    validate_body(&req)?;
    let other: UserId = parse_id(&req.other_user_id, "user")?;
    Ok(Json(
        state.conversation_service.get_or_create(&auth, other).await?,
    ))
}

/// GET /api/conversations/{id}
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ConversationDetail>> {
    let id = conversation_id(&id)?;
    Ok(Json(state.conversation_service.get(&auth, id).await?))
}

/// GET /api/conversations/{id}/messages
pub async fn messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<MessageView>>> {
    let id = conversation_id(&id)?;
    Ok(Json(state.conversation_service.messages(&auth, id).await?))
}

/// POST /api/conversations/{id}/messages
///
/// Goes through the broker so the message is stored and fanned out once,
/// in order with socket sends to the same conversation. Participation is
/// checked here only when the broker is not already checking it.
pub async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<(StatusCode, Json<MessageView>)> {
    validate_body(&req)?;
    let id = conversation_id(&id)?;
    if !state.realtime.broker.config().authorize_subscriptions {
        state
            .conversation_service
            .require_participant(&auth, id)
            .await?;
    }

    let message = state
        .realtime
        .broker
        .send(auth.user_id, Topic::Conversation(id), &req.content)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// DELETE /api/conversations/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = conversation_id(&id)?;
    state.conversation_service.delete(&auth, id).await?;
    Ok(Json(MessageResponse::new("Conversation deleted successfully")))
}
