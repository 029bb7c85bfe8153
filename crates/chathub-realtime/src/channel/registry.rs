//! Topic → subscribed sessions.

use std::collections::HashSet;

use dashmap::DashMap;

use chathub_core::types::SessionId;
use chathub_entity::topic::Topic;

use super::subscription::SubscriptionTracker;

/// Registry of every topic's broadcast group.
///
/// A group exists only while it has at least one subscriber.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    groups: DashMap<Topic, HashSet<SessionId>>,
    subscriptions: SubscriptionTracker,
}

impl ChannelRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a session to a topic's group. Returns `false` if already there.
    pub fn subscribe(&self, topic: Topic, session_id: SessionId) -> bool {
        self.groups.entry(topic).or_default().insert(session_id);
        self.subscriptions.add(session_id, topic)
    }

    /// Removes a session from a topic's group. Returns `false` if it was not a member.
    pub fn unsubscribe(&self, topic: Topic, session_id: SessionId) -> bool {
        self.leave_group(&topic, session_id);
        self.subscriptions.remove(session_id, &topic)
    }

    /// Removes a session from every group it joined.
    pub fn unsubscribe_all(&self, session_id: SessionId) -> usize {
        let topics = self.subscriptions.remove_all(session_id);
        for topic in &topics {
            self.leave_group(topic, session_id);
        }
        topics.len()
    }

    fn leave_group(&self, topic: &Topic, session_id: SessionId) {
        if let Some(mut members) = self.groups.get_mut(topic) {
            members.remove(&session_id);
            if members.is_empty() {
                drop(members);
                self.groups.remove_if(topic, |_, m| m.is_empty());
            }
        }
    }

    /// Current members of a topic's group.
    pub fn subscribers(&self, topic: &Topic) -> Vec<SessionId> {
        self.groups
            .get(topic)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Whether the session is in the topic's group.
    pub fn is_subscribed(&self, topic: &Topic, session_id: SessionId) -> bool {
        self.subscriptions.contains(session_id, topic)
    }

    /// Topics the session is subscribed to.
    pub fn topics_of(&self, session_id: SessionId) -> Vec<Topic> {
        self.subscriptions.topics(session_id)
    }

    /// Number of topics the session is subscribed to.
    pub fn subscription_count(&self, session_id: SessionId) -> usize {
        self.subscriptions.count(session_id)
    }

    /// Number of topics with at least one subscriber.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Subscriptions across all sessions.
    pub fn total_subscriptions(&self) -> usize {
        self.subscriptions.total()
    }
}
