//! Participant and creator checks for topics.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use chathub_core::error::AppError;
use chathub_core::result::AppResult;
use chathub_core::types::UserId;
use chathub_database::ChatStore;
use chathub_entity::topic::{Topic, TopicKind};

/// Who may read, write and delete a topic.
#[derive(Debug)]
struct TopicAccess {
    participants: Vec<Uuid>,
    /// Rooms only. Conversations let any participant delete.
    creator: Option<Uuid>,
}

/// Decides whether a user may use or delete a room or conversation.
#[derive(Debug, Clone)]
pub struct AccessChecker {
    store: Arc<dyn ChatStore>,
}

impl AccessChecker {
    /// Creates a checker over the chat store.
    pub fn new(store: Arc<dyn ChatStore>) -> Self {
        Self { store }
    }

    async fn resolve(&self, topic: Topic) -> AppResult<Option<TopicAccess>> {
        Ok(match topic {
            Topic::Room(id) => self
                .store
                .find_room(id.into_uuid())
                .await?
                .map(|room| TopicAccess {
                    participants: room.participant_ids,
                    creator: Some(room.creator_id),
                }),
            Topic::Conversation(id) => self
                .store
                .find_conversation(id.into_uuid())
                .await?
                .map(|conversation| TopicAccess {
                    participants: conversation.participants().to_vec(),
                    creator: None,
                }),
        })
    }

    /// True iff the user is a participant. A missing topic yields `false`.
    pub async fn can_access(&self, user: UserId, topic: Topic) -> AppResult<bool> {
        Ok(self
            .resolve(topic)
            .await?
            .is_some_and(|access| access.participants.contains(user.as_uuid())))
    }

    /// Rooms: only the creator. Conversations: any participant.
    pub async fn can_delete(&self, user: UserId, topic: Topic) -> AppResult<bool> {
        Ok(self
            .resolve(topic)
            .await?
            .is_some_and(|access| deletable_by(&access, user)))
    }

    /// Fails with `NotFound` for a missing topic and `Authorization` for a
    /// non-participant.
    pub async fn require_access(&self, user: UserId, topic: Topic) -> AppResult<()> {
        let access = self
            .resolve(topic)
            .await?
            .ok_or_else(|| not_found(topic.kind()))?;
        if !access.participants.contains(user.as_uuid()) {
            debug!(user_id = %user, topic = %topic, "Topic access denied");
            return Err(AppError::authorization(format!(
                "Not authorized to access this {}",
                label(topic.kind())
            )));
        }
        Ok(())
    }

    /// Like [`Self::require_access`], with the stricter delete rule.
    pub async fn require_delete(&self, user: UserId, topic: Topic) -> AppResult<()> {
        let access = self
            .resolve(topic)
            .await?
            .ok_or_else(|| not_found(topic.kind()))?;
        if !deletable_by(&access, user) {
            debug!(user_id = %user, topic = %topic, "Topic delete denied");
            return Err(AppError::authorization(format!(
                "Not authorized to delete this {}",
                label(topic.kind())
            )));
        }
        Ok(())
    }
}

fn deletable_by(access: &TopicAccess, user: UserId) -> bool {
    match access.creator {
        Some(creator) => creator == user.into_uuid(),
        None => access.participants.contains(user.as_uuid()),
    }
}

fn label(kind: TopicKind) -> &'static str {
    match kind {
        TopicKind::Room => "chat room",
        TopicKind::Conversation => "conversation",
    }
}

fn not_found(kind: TopicKind) -> AppError {
    match kind {
        TopicKind::Room => AppError::not_found("Chat room not found"),
        TopicKind::Conversation => AppError::not_found("Conversation not found"),
    }
}
