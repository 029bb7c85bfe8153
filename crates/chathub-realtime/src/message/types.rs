//! Inbound and outbound socket events.
//!
//! Every frame is a JSON text frame of the form
//! `{"event": "<name>", "data": <payload>}`.

use serde::{Deserialize, Serialize};

use chathub_core::error::AppError;
use chathub_entity::message::MessageView;

/// Events sent by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum InboundEvent {
    /// Announce the user behind this session.
    Join(JoinPayload),
    /// Subscribe to a room.
    JoinRoom(String),
    /// Unsubscribe from a room.
    LeaveRoom(String),
    /// Subscribe to a conversation.
    JoinConversation(String),
    /// Unsubscribe from a conversation.
    LeaveConversation(String),
    /// Post to a room.
    SendMessage(SendMessagePayload),
    /// Post to a conversation.
    SendDirectMessage(SendDirectPayload),
}

/// Payload of `join`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinPayload {
    /// User the session acts for.
    pub user_id: String,
}

/// Payload of `sendMessage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    /// Target room.
    pub room_id: String,
    /// Message text.
    pub message: String,
    /// Claimed author. Must match the joined user when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
}

/// Payload of `sendDirectMessage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendDirectPayload {
    /// Target conversation.
    pub conversation_id: String,
    /// Message text.
    pub message: String,
}

/// Events pushed to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum OutboundEvent {
    /// A message was posted to a subscribed topic.
    NewMessage(MessageView),
    /// Something this session asked for failed.
    Error(ErrorPayload),
}

/// Body of an `error` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Error kind, e.g. `VALIDATION` or `TRANSPORT`.
    pub code: String,
    /// Human-readable description.
    pub message: String,
}

impl OutboundEvent {
    /// An error event carrying the error's own message.
    pub fn error(err: &AppError) -> Self {
        Self::error_with(err, err.message.clone())
    }

    /// An error event with the kind of `err` and a replacement message.
    pub fn error_with(err: &AppError, message: impl Into<String>) -> Self {
        Self::Error(ErrorPayload {
            code: err.kind.to_string(),
            message: message.into(),
        })
    }
}
