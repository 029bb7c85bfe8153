//! Response DTOs.

use serde::{Deserialize, Serialize};

use chathub_entity::user::User;
use chathub_realtime::server::RealtimeStats;

/// Plain confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `PUT /api/users/update`
#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdatedResponse {
    pub message: String,
    pub user: User,
}

/// `GET /api/health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// `GET /api/health/detailed`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedHealthResponse {
    pub status: String,
    pub version: String,
    /// Store backend name.
    pub database: String,
    /// Whether the store answered its health check.
    pub database_ok: bool,
    pub realtime: RealtimeStats,
}
