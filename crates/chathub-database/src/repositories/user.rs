//! User queries.

use async_trait::async_trait;
use uuid::Uuid;

use chathub_core::error::{AppError, ErrorKind};
use chathub_core::result::AppResult;
use chathub_entity::user::{CreateUser, UpdateUser, User};

use super::{PgStore, db_error, relabel};
use crate::store::UserStore;

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, data: CreateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, first_name, last_name, email, password_hash)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.email)
        .bind(&data.password_hash)
        .fetch_one(self.pool())
        .await
        .map_err(|e| {
            relabel(
                db_error("Failed to create user", e),
                ErrorKind::Conflict,
                "User already exists",
            )
        })
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| db_error("Failed to find user by id", e))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| db_error("Failed to find user by email", e))
    }

    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(self.pool())
            .await
            .map_err(|e| db_error("Failed to load users", e))
    }

    async fn update_profile(&self, id: Uuid, data: UpdateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.email)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            relabel(
                db_error("Failed to update user", e),
                ErrorKind::Conflict,
                "Email already in use",
            )
        })?
        .ok_or_else(|| AppError::not_found("User not found"))
    }

    async fn list_others(&self, except: Uuid) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE id <> $1 ORDER BY first_name ASC, last_name ASC",
        )
        .bind(except)
        .fetch_all(self.pool())
        .await
        .map_err(|e| db_error("Failed to list users", e))
    }
}
