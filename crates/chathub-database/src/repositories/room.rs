//! Chat room queries.

use async_trait::async_trait;
use uuid::Uuid;

use chathub_core::error::{AppError, ErrorKind};
use chathub_core::result::AppResult;
use chathub_entity::room::{ChatRoom, CreateRoom};

use super::{PgStore, db_error, relabel};
use crate::store::RoomStore;

/// Room columns with the participant list aggregated in join order.
const ROOM_SELECT: &str = "SELECT r.id, r.name, r.creator_id, r.created_at,
        COALESCE(
            array_agg(p.user_id ORDER BY p.joined_at) FILTER (WHERE p.user_id IS NOT NULL),
            '{}'::uuid[]
        ) AS participant_ids
     FROM chat_rooms r
     LEFT JOIN room_participants p ON p.room_id = r.id";

impl PgStore {
    async fn load_room(&self, id: Uuid) -> AppResult<Option<ChatRoom>> {
        let sql = format!("{ROOM_SELECT} WHERE r.id = $1 GROUP BY r.id");
        sqlx::query_as::<_, ChatRoom>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| db_error("Failed to find chat room", e))
    }
}

#[async_trait]
impl RoomStore for PgStore {
    async fn create_room(&self, data: CreateRoom) -> AppResult<ChatRoom> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let id = Uuid::new_v4();
        let created_at: chrono::DateTime<chrono::Utc> = sqlx::query_scalar(
            "INSERT INTO chat_rooms (id, name, creator_id) VALUES ($1, $2, $3)
             RETURNING created_at",
        )
        .bind(id)
        .bind(&data.name)
        .bind(data.creator_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            relabel(
                db_error("Failed to create chat room", e),
                ErrorKind::NotFound,
                "User not found",
            )
        })?;

        sqlx::query("INSERT INTO room_participants (room_id, user_id) VALUES ($1, $2)")
            .bind(id)
            .bind(data.creator_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to add room creator", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit chat room", e))?;

        Ok(ChatRoom {
            id,
            name: data.name,
            creator_id: data.creator_id,
            participant_ids: vec![data.creator_id],
            created_at,
        })
    }

    async fn find_room(&self, id: Uuid) -> AppResult<Option<ChatRoom>> {
        self.load_room(id).await
    }

    async fn list_rooms(&self) -> AppResult<Vec<ChatRoom>> {
        let sql = format!("{ROOM_SELECT} GROUP BY r.id ORDER BY r.created_at DESC");
        sqlx::query_as::<_, ChatRoom>(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(|e| db_error("Failed to list chat rooms", e))
    }

    async fn add_participant(&self, room_id: Uuid, user_id: Uuid) -> AppResult<ChatRoom> {
        sqlx::query(
            "INSERT INTO room_participants (room_id, user_id) VALUES ($1, $2)
             ON CONFLICT (room_id, user_id) DO NOTHING",
        )
        .bind(room_id)
        .bind(user_id)
        .execute(self.pool())
        .await
        .map_err(|e| {
            relabel(
                db_error("Failed to join chat room", e),
                ErrorKind::NotFound,
                "Chat room not found",
            )
        })?;

        self.load_room(room_id)
            .await?
            .ok_or_else(|| AppError::not_found("Chat room not found"))
    }

    async fn remove_participant(&self, room_id: Uuid, user_id: Uuid) -> AppResult<ChatRoom> {
        sqlx::query("DELETE FROM room_participants WHERE room_id = $1 AND user_id = $2")
            .bind(room_id)
            .bind(user_id)
            .execute(self.pool())
            .await
            .map_err(|e| db_error("Failed to leave chat room", e))?;

        self.load_room(room_id)
            .await?
            .ok_or_else(|| AppError::not_found("Chat room not found"))
    }

    async fn delete_room(&self, id: Uuid) -> AppResult<bool> {
        // Messages and participants go with the room via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM chat_rooms WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(|e| db_error("Failed to delete chat room", e))?;
        Ok(result.rows_affected() > 0)
    }
}
