//! Real-time broker configuration.

use serde::{Deserialize, Serialize};

/// Settings for live socket sessions and fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Outbound buffer per session; deliveries beyond it are dropped.
    #[serde(default = "default_session_buffer")]
    pub session_buffer_size: usize,
    /// Interval between server pings in seconds.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_seconds: u64,
    /// A session with no inbound traffic for this long is closed.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
    /// Maximum topics a single session may subscribe to.
    #[serde(default = "default_max_subscriptions")]
    pub max_subscriptions_per_session: usize,
    /// Maximum inbound frame size in bytes.
    #[serde(default = "default_max_frame")]
    pub max_frame_bytes: usize,
    /// Check topic membership before subscribing or sending.
    #[serde(default = "default_true")]
    pub authorize_subscriptions: bool,
    /// Require a JWT on upgrade and pin `join` to that user.
    #[serde(default = "default_true")]
    pub require_token: bool,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            session_buffer_size: default_session_buffer(),
            ping_interval_seconds: default_ping_interval(),
            idle_timeout_seconds: default_idle_timeout(),
            max_subscriptions_per_session: default_max_subscriptions(),
            max_frame_bytes: default_max_frame(),
            authorize_subscriptions: true,
            require_token: true,
        }
    }
}

fn default_session_buffer() -> usize {
    256
}

fn default_ping_interval() -> u64 {
    30
}

fn default_idle_timeout() -> u64 {
    90
}

fn default_max_subscriptions() -> usize {
    100
}

fn default_max_frame() -> usize {
    65_536
}

fn default_true() -> bool {
    true
}
