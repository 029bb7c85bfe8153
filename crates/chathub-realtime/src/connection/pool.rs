//! All live sessions by ID.

use std::sync::Arc;

use dashmap::DashMap;

use chathub_core::types::SessionId;

use super::handle::SessionHandle;

/// Thread-safe pool of connected sessions.
#[derive(Debug, Default)]
pub struct SessionPool {
    sessions: DashMap<SessionId, Arc<SessionHandle>>,
}

impl SessionPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a session.
    pub fn add(&self, handle: Arc<SessionHandle>) {
        self.sessions.insert(handle.id, handle);
    }

    /// Removes a session.
    pub fn remove(&self, session_id: &SessionId) -> Option<Arc<SessionHandle>> {
        self.sessions.remove(session_id).map(|(_, handle)| handle)
    }

    /// Looks up a session.
    pub fn get(&self, session_id: &SessionId) -> Option<Arc<SessionHandle>> {
        self.sessions.get(session_id).map(|entry| entry.value().clone())
    }

    /// Number of connected sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session is connected.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Snapshot of all sessions.
    pub fn all(&self) -> Vec<Arc<SessionHandle>> {
        self.sessions
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}
