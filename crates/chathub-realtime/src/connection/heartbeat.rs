//! Keepalive pings and idle eviction.

use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tracing::{debug, warn};

use chathub_core::config::RealtimeConfig;

use super::handle::{OutboundFrame, SessionHandle};

/// Heartbeat timing.
#[derive(Debug, Clone, Copy)]
pub struct HeartbeatConfig {
    /// Interval between pings.
    pub ping_interval: Duration,
    /// Inbound silence after which the session is closed.
    pub idle_timeout: Duration,
}

impl From<&RealtimeConfig> for HeartbeatConfig {
    fn from(config: &RealtimeConfig) -> Self {
        Self {
            ping_interval: Duration::from_secs(config.ping_interval_seconds.max(1)),
            idle_timeout: Duration::from_secs(config.idle_timeout_seconds.max(1)),
        }
    }
}

/// Pings the session periodically and closes it once it goes quiet.
///
/// Ends when the session is closed or cancelled.
pub async fn run_heartbeat(handle: Arc<SessionHandle>, config: HeartbeatConfig) {
    let cancel = handle.cancellation();
    let mut interval = time::interval(config.ping_interval);
    interval.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        if !handle.is_alive() {
            break;
        }

        let idle = handle.idle_for();
        if idle > config.idle_timeout {
            warn!(session_id = %handle.id, idle_secs = idle.as_secs(), "Session idle, closing");
            handle.close();
            break;
        }

        handle.send(OutboundFrame::Ping);
    }

    debug!(session_id = %handle.id, "Heartbeat stopped");
}
