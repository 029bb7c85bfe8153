//! Durable message writes.

use std::sync::Arc;

use tracing::error;

use chathub_core::error::AppError;
use chathub_core::result::AppResult;
use chathub_core::types::UserId;
use chathub_database::ChatStore;
use chathub_entity::message::{CreateMessage, MessageView};
use chathub_entity::topic::Topic;

/// Persists messages and resolves them into deliverable views.
///
/// This is the single write path for messages; callers decide about
/// authorization beforehand.
#[derive(Debug, Clone)]
pub struct MessageService {
    store: Arc<dyn ChatStore>,
}

impl MessageService {
    /// Creates a new message service.
    pub fn new(store: Arc<dyn ChatStore>) -> Self {
        Self { store }
    }

    /// Stores a message under `topic` and returns it with the sender's names.
    ///
    /// Blank content fails with `Validation` before the store is touched.
    pub async fn persist(
        &self,
        sender: UserId,
        topic: Topic,
        content: &str,
    ) -> AppResult<MessageView> {
        let data = CreateMessage::new(topic, sender.into_uuid(), content)?;

        let sender_user = self
            .store
            .find_by_id(sender.into_uuid())
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        let message = self.store.create_message(data).await.map_err(|e| {
            error!(topic = %topic, sender = %sender, error = %e, "Failed to persist message");
            e
        })?;

        Ok(MessageView::new(message, sender_user.summary()))
    }

    /// History of a topic, oldest first. No access check.
    pub async fn history(&self, topic: Topic) -> AppResult<Vec<MessageView>> {
        self.store.list_messages(topic).await
    }
}
