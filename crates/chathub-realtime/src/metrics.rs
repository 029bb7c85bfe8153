//! Broker counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Monotonic counters plus the live-session gauge.
#[derive(Debug, Default)]
pub struct BrokerMetrics {
    connections_total: AtomicU64,
    connections_active: AtomicU64,
    frames_received: AtomicU64,
    messages_persisted: AtomicU64,
    deliveries: AtomicU64,
    deliveries_dropped: AtomicU64,
    persistence_failures: AtomicU64,
}

impl BrokerMetrics {
    /// Zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        // Saturating: a double close must not wrap the gauge.
        let _ = self
            .connections_active
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    pub fn frame_received(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn message_persisted(&self) {
        self.messages_persisted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn persistence_failed(&self) {
        self.persistence_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Records the outcome of one fan-out.
    pub fn fanned_out(&self, delivered: u64, dropped: u64) {
        self.deliveries.fetch_add(delivered, Ordering::Relaxed);
        self.deliveries_dropped.fetch_add(dropped, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            frames_received: self.frames_received.load(Ordering::Relaxed),
            messages_persisted: self.messages_persisted.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            deliveries_dropped: self.deliveries_dropped.load(Ordering::Relaxed),
            persistence_failures: self.persistence_failures.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub connections_total: u64,
    pub connections_active: u64,
    pub frames_received: u64,
    pub messages_persisted: u64,
    pub deliveries: u64,
    pub deliveries_dropped: u64,
    pub persistence_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_gauge_never_wraps() {
        let metrics = BrokerMetrics::new();
        metrics.connection_opened();
        metrics.connection_closed();
        metrics.connection_closed();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.connections_total, 1);
        assert_eq!(snapshot.connections_active, 0);
    }

    #[test]
    fn test_fan_out_accumulates() {
        let metrics = BrokerMetrics::new();
        metrics.fanned_out(3, 1);
        metrics.fanned_out(2, 0);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.deliveries, 5);
        assert_eq!(snapshot.deliveries_dropped, 1);
    }
}
