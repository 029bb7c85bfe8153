//! Reverse index from session to subscribed topics.

use std::collections::HashSet;

use dashmap::DashMap;

use chathub_core::types::SessionId;
use chathub_entity::topic::Topic;

/// Which topics each session is subscribed to.
#[derive(Debug, Default)]
pub struct SubscriptionTracker {
    by_session: DashMap<SessionId, HashSet<Topic>>,
}

impl SubscriptionTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a subscription. Returns `false` if it already existed.
    pub fn add(&self, session_id: SessionId, topic: Topic) -> bool {
        self.by_session.entry(session_id).or_default().insert(topic)
    }

    /// Drops a subscription. Returns `false` if there was none.
    pub fn remove(&self, session_id: SessionId, topic: &Topic) -> bool {
        let Some(mut topics) = self.by_session.get_mut(&session_id) else {
            return false;
        };
        let removed = topics.remove(topic);
        if topics.is_empty() {
            drop(topics);
            self.by_session.remove_if(&session_id, |_, t| t.is_empty());
        }
        removed
    }

    /// Whether the session is subscribed to the topic.
    pub fn contains(&self, session_id: SessionId, topic: &Topic) -> bool {
        self.by_session
            .get(&session_id)
            .is_some_and(|topics| topics.contains(topic))
    }

    /// Topics the session is subscribed to.
    pub fn topics(&self, session_id: SessionId) -> Vec<Topic> {
        self.by_session
            .get(&session_id)
            .map(|topics| topics.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of subscriptions held by the session.
    pub fn count(&self, session_id: SessionId) -> usize {
        self.by_session
            .get(&session_id)
            .map(|topics| topics.len())
            .unwrap_or(0)
    }

    /// Removes and returns every subscription of the session.
    pub fn remove_all(&self, session_id: SessionId) -> HashSet<Topic> {
        self.by_session
            .remove(&session_id)
            .map(|(_, topics)| topics)
            .unwrap_or_default()
    }

    /// Total subscriptions across all sessions.
    pub fn total(&self) -> usize {
        self.by_session.iter().map(|entry| entry.value().len()).sum()
    }
}
