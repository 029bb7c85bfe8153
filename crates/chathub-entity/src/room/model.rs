//! Chat room entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::user::UserSummary;

/// A named multi-party topic.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChatRoom {
    /// Unique room identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// User who created the room; the only one allowed to delete it.
    pub creator_id: Uuid,
    /// Current participants, in no particular order.
    pub participant_ids: Vec<Uuid>,
    /// When the room was created.
    pub created_at: DateTime<Utc>,
}

impl ChatRoom {
    /// Whether the user is currently a participant.
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.participant_ids.contains(&user_id)
    }

    /// Whether the user created this room.
    pub fn is_creator(&self, user_id: Uuid) -> bool {
        self.creator_id == user_id
    }
}

/// Data required to create a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoom {
    /// Display name, already trimmed.
    pub name: String,
    /// Creating user; inserted as the first participant.
    pub creator_id: Uuid,
}

/// Room with resolved creator and participant names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetail {
    /// Room ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Creator summary.
    pub creator: UserSummary,
    /// Participant summaries.
    pub participants: Vec<UserSummary>,
    /// When the room was created.
    pub created_at: DateTime<Utc>,
}
