//! Message queries.

use async_trait::async_trait;
use uuid::Uuid;

use chathub_core::error::ErrorKind;
use chathub_core::result::AppResult;
use chathub_entity::message::{CreateMessage, Message, MessageRow, MessageView};
use chathub_entity::topic::Topic;

use super::{PgStore, db_error, relabel};
use crate::store::MessageStore;

const MESSAGE_VIEW_SELECT: &str = "SELECT m.id, m.conversation_id, m.chat_room_id, m.sender_id,
        u.first_name AS sender_first_name, u.last_name AS sender_last_name,
        m.content, m.created_at AS \"timestamp\", m.is_read AS \"read\"
     FROM messages m
     JOIN users u ON u.id = m.sender_id";

#[async_trait]
impl MessageStore for PgStore {
    async fn create_message(&self, data: CreateMessage) -> AppResult<Message> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let message = sqlx::query_as::<_, Message>(
            "INSERT INTO messages (id, conversation_id, chat_room_id, sender_id, content)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, conversation_id, chat_room_id, sender_id, content,
                       created_at AS \"timestamp\", is_read AS \"read\"",
        )
        .bind(Uuid::new_v4())
        .bind(data.conversation_id())
        .bind(data.chat_room_id())
        .bind(data.sender_id())
        .bind(data.content())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            relabel(
                db_error("Failed to store message", e),
                ErrorKind::NotFound,
                "Topic not found",
            )
        })?;

        if let Some(conversation_id) = message.conversation_id {
            sqlx::query("UPDATE conversations SET last_message_id = $1 WHERE id = $2")
                .bind(message.id)
                .bind(conversation_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| db_error("Failed to link last message", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit message", e))?;

        Ok(message)
    }

    async fn find_message(&self, id: Uuid) -> AppResult<Option<MessageView>> {
        let sql = format!("{MESSAGE_VIEW_SELECT} WHERE m.id = $1");
        let row = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| db_error("Failed to find message", e))?;
        Ok(row.map(MessageView::from))
    }

    async fn list_messages(&self, topic: Topic) -> AppResult<Vec<MessageView>> {
        let column = match topic {
            Topic::Room(_) => "m.chat_room_id",
            Topic::Conversation(_) => "m.conversation_id",
        };
        let sql = format!(
            "{MESSAGE_VIEW_SELECT} WHERE {column} = $1 ORDER BY m.created_at ASC, m.seq ASC"
        );
        let rows = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(topic.uuid())
            .fetch_all(self.pool())
            .await
            .map_err(|e| db_error("Failed to list messages", e))?;
        Ok(rows.into_iter().map(MessageView::from).collect())
    }
}
