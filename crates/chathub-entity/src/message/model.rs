//! Message entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use chathub_core::AppError;
use chathub_core::types::{ConversationId, RoomId};

use crate::topic::Topic;
use crate::user::UserSummary;

/// A stored message. Immutable once created.
///
/// Exactly one of `conversation_id` / `chat_room_id` is set.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique message identifier.
    pub id: Uuid,
    /// Parent conversation, for direct messages.
    pub conversation_id: Option<Uuid>,
    /// Parent room, for room messages.
    pub chat_room_id: Option<Uuid>,
    /// Author.
    pub sender_id: Uuid,
    /// Trimmed, non-empty text.
    pub content: String,
    /// Server-assigned creation time.
    pub timestamp: DateTime<Utc>,
    /// Read flag. Stored but not interpreted.
    pub read: bool,
}

impl Message {
    /// The topic this message belongs to.
    pub fn topic(&self) -> Option<Topic> {
        match (self.conversation_id, self.chat_room_id) {
            (Some(id), None) => Some(Topic::Conversation(ConversationId::from_uuid(id))),
            (None, Some(id)) => Some(Topic::Room(RoomId::from_uuid(id))),
            _ => None,
        }
    }
}

/// Data required to store a message.
///
/// Only [`CreateMessage::new`] builds one, so the content is always trimmed
/// and non-empty by the time it reaches a store.
#[derive(Debug, Clone)]
pub struct CreateMessage {
    topic: Topic,
    sender_id: Uuid,
    content: String,
}

impl CreateMessage {
    /// Builds a message, rejecting content that is blank after trimming.
    pub fn new(topic: Topic, sender_id: Uuid, content: &str) -> Result<Self, AppError> {
        Ok(Self {
            topic,
            sender_id,
            content: normalize_content(content)?,
        })
    }

    /// Parent topic.
    pub fn topic(&self) -> Topic {
        self.topic
    }

    /// Author.
    pub fn sender_id(&self) -> Uuid {
        self.sender_id
    }

    /// Trimmed content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Consumes the request, yielding its content.
    pub fn into_content(self) -> String {
        self.content
    }

    /// Column value for `conversation_id`.
    pub fn conversation_id(&self) -> Option<Uuid> {
        match self.topic {
            Topic::Conversation(id) => Some(id.into_uuid()),
            Topic::Room(_) => None,
        }
    }

    /// Column value for `chat_room_id`.
    pub fn chat_room_id(&self) -> Option<Uuid> {
        match self.topic {
            Topic::Room(id) => Some(id.into_uuid()),
            Topic::Conversation(_) => None,
        }
    }
}

/// Trims message content and rejects empty text.
pub fn normalize_content(content: &str) -> Result<String, AppError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Message content is required"));
    }
    Ok(trimmed.to_string())
}

/// Flat row of a message joined with its sender's names.
#[derive(Debug, Clone, FromRow)]
pub struct MessageRow {
    pub id: Uuid,
    pub conversation_id: Option<Uuid>,
    pub chat_room_id: Option<Uuid>,
    pub sender_id: Uuid,
    pub sender_first_name: String,
    pub sender_last_name: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

/// Message with the sender resolved, as delivered to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    /// Message ID.
    pub id: Uuid,
    /// Parent conversation.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub conversation: Option<Uuid>,
    /// Parent room.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub chat_room: Option<Uuid>,
    /// Sender with display names.
    pub sender: UserSummary,
    /// Content.
    pub content: String,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
    /// Read flag.
    pub read: bool,
}

impl MessageView {
    /// Assembles a view from a stored message and its sender.
    pub fn new(message: Message, sender: UserSummary) -> Self {
        Self {
            id: message.id,
            conversation: message.conversation_id,
            chat_room: message.chat_room_id,
            sender: UserSummary {
                email: None,
                ..sender
            },
            content: message.content,
            timestamp: message.timestamp,
            read: message.read,
        }
    }
}

impl From<MessageRow> for MessageView {
    fn from(row: MessageRow) -> Self {
        Self {
            id: row.id,
            conversation: row.conversation_id,
            chat_room: row.chat_room_id,
            sender: UserSummary {
                id: row.sender_id,
                first_name: row.sender_first_name,
                last_name: row.sender_last_name,
                email: None,
            },
            content: row.content,
            timestamp: row.timestamp,
            read: row.read,
        }
    }
}
