//! Topic: the broadcast scope shared by rooms and conversations.
//!
//! Rooms and conversations are stored separately but behave identically
//! for subscription, sending, and fan-out, so everything above the store
//! speaks in terms of [`Topic`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use chathub_core::AppError;
use chathub_core::types::{ConversationId, RoomId};

/// Which kind of topic an identifier refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicKind {
    /// Multi-party chat room.
    Room,
    /// Two-party conversation.
    Conversation,
}

impl TopicKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Room => "room",
            Self::Conversation => "conversation",
        }
    }
}

impl fmt::Display for TopicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TopicKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "room" => Ok(Self::Room),
            "conversation" => Ok(Self::Conversation),
            _ => Err(AppError::validation(format!("Invalid topic kind: '{s}'"))),
        }
    }
}

/// A room or conversation identifier used as a broadcast scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Topic {
    /// A chat room.
    Room(RoomId),
    /// A two-party conversation.
    Conversation(ConversationId),
}

impl Topic {
    /// Builds a topic from a kind and a client-supplied id string.
    pub fn parse(kind: TopicKind, id: &str) -> Result<Self, AppError> {
        let invalid = |_| AppError::validation(format!("Invalid {kind} id: '{id}'"));
        match kind {
            TopicKind::Room => id.parse().map(Topic::Room).map_err(invalid),
            TopicKind::Conversation => id.parse().map(Topic::Conversation).map_err(invalid),
        }
    }

    /// Returns the kind of this topic.
    pub fn kind(&self) -> TopicKind {
        match self {
            Topic::Room(_) => TopicKind::Room,
            Topic::Conversation(_) => TopicKind::Conversation,
        }
    }

    /// Returns the raw UUID regardless of kind.
    pub fn uuid(&self) -> uuid::Uuid {
        match self {
            Topic::Room(id) => id.into_uuid(),
            Topic::Conversation(id) => id.into_uuid(),
        }
    }

    /// Name of the broadcast group for this topic.
    pub fn channel_name(&self) -> String {
        format!("{}:{}", self.kind(), self.uuid())
    }

    /// Parses a broadcast group name back into a topic.
    pub fn from_channel_name(channel: &str) -> Option<Self> {
        let (kind, id) = channel.split_once(':')?;
        let kind = kind.parse().ok()?;
        Self::parse(kind, id).ok()
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.channel_name())
    }
}
