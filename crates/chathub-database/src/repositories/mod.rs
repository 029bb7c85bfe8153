//! PostgreSQL implementation of the chat store.
//!
//! One [`PgStore`] implements every store trait; the impl blocks are split
//! per entity across the sibling modules.

pub mod conversation;
pub mod message;
pub mod room;
pub mod user;

use async_trait::async_trait;
use sqlx::PgPool;

use chathub_core::error::{AppError, ErrorKind};
use chathub_core::result::AppResult;

use crate::store::ChatStore;

/// Unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";
/// Foreign key violation.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Chat store backed by a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ChatStore for PgStore {
    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| db_error("Health check failed", e))
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

/// Classify a sqlx error.
///
/// Constraint violations become `Conflict`/`NotFound`, an unreachable
/// server becomes `Transport`, everything else is `Database`.
pub(crate) fn db_error(context: &str, err: sqlx::Error) -> AppError {
    let kind = match &err {
        sqlx::Error::Database(db) => match db.code().as_deref() {
            Some(UNIQUE_VIOLATION) => ErrorKind::Conflict,
            Some(FOREIGN_KEY_VIOLATION) => ErrorKind::NotFound,
            _ => ErrorKind::Database,
        },
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            ErrorKind::Transport
        }
        _ => ErrorKind::Database,
    };
    AppError::with_source(kind, context.to_string(), err)
}

/// Give a classified error of `kind` a caller-facing message.
pub(crate) fn relabel(err: AppError, kind: ErrorKind, message: &str) -> AppError {
    if err.kind == kind {
        AppError {
            message: message.to_string(),
            ..err
        }
    } else {
        err
    }
}
