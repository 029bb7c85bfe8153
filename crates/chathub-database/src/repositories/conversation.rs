//! Conversation queries.

use async_trait::async_trait;
use uuid::Uuid;

use chathub_core::result::AppResult;
use chathub_entity::conversation::{Conversation, ParticipantPair};

use super::{PgStore, db_error};
use crate::store::ConversationStore;

#[async_trait]
impl ConversationStore for PgStore {
    async fn get_or_create_conversation(&self, pair: ParticipantPair) -> AppResult<Conversation> {
        // The unique pair constraint decides the race; the loser re-reads.
        sqlx::query(
            "INSERT INTO conversations (id, user_low, user_high) VALUES ($1, $2, $3)
             ON CONFLICT (user_low, user_high) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(pair.low)
        .bind(pair.high)
        .execute(self.pool())
        .await
        .map_err(|e| db_error("Failed to create conversation", e))?;

        sqlx::query_as::<_, Conversation>(
            "SELECT * FROM conversations WHERE user_low = $1 AND user_high = $2",
        )
        .bind(pair.low)
        .bind(pair.high)
        .fetch_one(self.pool())
        .await
        .map_err(|e| db_error("Failed to load conversation", e))
    }

    async fn find_conversation(&self, id: Uuid) -> AppResult<Option<Conversation>> {
        sqlx::query_as::<_, Conversation>("SELECT * FROM conversations WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| db_error("Failed to find conversation", e))
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Conversation>> {
        sqlx::query_as::<_, Conversation>(
            "SELECT c.* FROM conversations c
             LEFT JOIN messages m ON m.id = c.last_message_id
             WHERE c.user_low = $1 OR c.user_high = $1
             ORDER BY m.created_at DESC NULLS LAST, c.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await
        .map_err(|e| db_error("Failed to list conversations", e))
    }

    async fn delete_conversation(&self, id: Uuid) -> AppResult<bool> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        // Break the last_message cycle before the cascade removes messages.
        sqlx::query("UPDATE conversations SET last_message_id = NULL WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to delete conversation", e))?;

        let result = sqlx::query("DELETE FROM conversations WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to delete conversation", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit conversation delete", e))?;

        Ok(result.rows_affected() > 0)
    }
}
