//! Conversation entity model.
//!
//! A conversation always has exactly two distinct participants. The pair
//! is stored in canonical order (`user_low < user_high`) so that a unique
//! index on the pair makes "get or create" idempotent from either side.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use chathub_core::AppError;

use crate::message::MessageView;
use crate::user::UserSummary;

/// Exactly-two-party topic.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Unique conversation identifier.
    pub id: Uuid,
    /// Smaller participant id of the canonical pair.
    pub user_low: Uuid,
    /// Larger participant id of the canonical pair.
    pub user_high: Uuid,
    /// Most recent message, `None` until the first one is stored.
    pub last_message_id: Option<Uuid>,
    /// When the conversation was created.
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Checks a requested participant list. The only way a pair reaches a store.
    pub fn validate_participants(participants: &[Uuid]) -> Result<ParticipantPair, AppError> {
        ParticipantPair::from_participants(participants)
    }

    /// Both participants.
    pub fn participants(&self) -> [Uuid; 2] {
        [self.user_low, self.user_high]
    }

    /// Whether the user is one of the two participants.
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.user_low == user_id || self.user_high == user_id
    }

    /// The participant that is not `user_id`.
    pub fn other_participant(&self, user_id: Uuid) -> Option<Uuid> {
        if self.user_low == user_id {
            Some(self.user_high)
        } else if self.user_high == user_id {
            Some(self.user_low)
        } else {
            None
        }
    }
}

/// Canonically ordered pair of conversation participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticipantPair {
    /// Smaller id.
    pub low: Uuid,
    /// Larger id.
    pub high: Uuid,
}

impl ParticipantPair {
    /// Validates a participant list and returns it in canonical order.
    ///
    /// Fails unless the list holds exactly two distinct users.
    pub fn from_participants(participants: &[Uuid]) -> Result<Self, AppError> {
        match participants {
            [a, b] if a != b => Ok(Self::new(*a, *b)),
            [_, _] => Err(AppError::validation(
                "A conversation requires two distinct participants",
            )),
            _ => Err(AppError::validation(
                "A conversation must have exactly 2 participants",
            )),
        }
    }

    fn new(a: Uuid, b: Uuid) -> Self {
        if a < b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }
}

/// Conversation with resolved participants and last message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDetail {
    /// Conversation ID.
    pub id: Uuid,
    /// Both participants.
    pub participants: Vec<UserSummary>,
    /// Most recent message, if any.
    pub last_message: Option<MessageView>,
    /// When the conversation was created.
    pub created_at: DateTime<Utc>,
}
