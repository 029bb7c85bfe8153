//! Top-level real-time engine owning the broker and its shared state.

use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

use chathub_auth::AccessChecker;
use chathub_core::config::RealtimeConfig;
use chathub_service::MessageService;

use crate::broker::Broker;
use crate::channel::ChannelRegistry;
use crate::connection::heartbeat::HeartbeatConfig;
use crate::metrics::{BrokerMetrics, MetricsSnapshot};
use crate::registry::MembershipRegistry;

/// Live figures for the detailed health endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeStats {
    pub sessions: usize,
    pub identified_users: usize,
    pub active_topics: usize,
    pub subscriptions: usize,
    pub counters: MetricsSnapshot,
}

/// Created at startup, torn down with [`RealtimeEngine::shutdown`].
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Event dispatcher.
    pub broker: Arc<Broker>,
    /// Topic broadcast groups.
    pub channels: Arc<ChannelRegistry>,
    /// User → session mapping.
    pub registry: Arc<MembershipRegistry>,
    /// Counters.
    pub metrics: Arc<BrokerMetrics>,
    heartbeat: HeartbeatConfig,
    shutdown: CancellationToken,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("sessions", &self.broker.session_count())
            .finish()
    }
}

impl RealtimeEngine {
    /// Builds the engine over the shared access checker and message service.
    pub fn new(config: RealtimeConfig, access: Arc<AccessChecker>, messages: MessageService) -> Self {
        let shutdown = CancellationToken::new();
        let metrics = Arc::new(BrokerMetrics::new());
        let channels = Arc::new(ChannelRegistry::new());
        let registry = Arc::new(MembershipRegistry::new());
        let heartbeat = HeartbeatConfig::from(&config);

        let broker = Arc::new(Broker::new(
            config,
            channels.clone(),
            registry.clone(),
            access,
            messages,
            metrics.clone(),
            shutdown.clone(),
        ));

        info!("Real-time engine initialized");

        Self {
            broker,
            channels,
            registry,
            metrics,
            heartbeat,
            shutdown,
        }
    }

    /// Keepalive timing for new sessions.
    pub fn heartbeat_config(&self) -> HeartbeatConfig {
        self.heartbeat
    }

    /// Whether `shutdown` has been called.
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Current session, topic and counter figures.
    pub fn stats(&self) -> RealtimeStats {
        RealtimeStats {
            sessions: self.broker.session_count(),
            identified_users: self.registry.user_count(),
            active_topics: self.channels.group_count(),
            subscriptions: self.channels.total_subscriptions(),
            counters: self.metrics.snapshot(),
        }
    }

    /// Cancels every session and empties the pool.
    pub fn shutdown(&self) {
        info!("Shutting down real-time engine");
        self.shutdown.cancel();
        self.broker.close_all();
        info!("Real-time engine shut down");
    }
}
