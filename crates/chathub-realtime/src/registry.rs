//! Membership registry: which session currently speaks for which user.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chathub_core::types::{SessionId, UserId};

/// The session currently representing a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionEntry {
    /// Session ID.
    pub session_id: SessionId,
    /// Connection order of the session; higher is newer.
    pub generation: u64,
}

#[derive(Debug, Default)]
struct Inner {
    by_user: HashMap<UserId, SessionEntry>,
    by_session: HashMap<SessionId, UserId>,
}

/// Process-wide user → session mapping with a reverse index.
///
/// Every read-modify-write happens under one mutex, so no caller ever
/// observes the two maps out of step.
#[derive(Debug, Default)]
pub struct MembershipRegistry {
    inner: Mutex<Inner>,
    generations: AtomicU64,
}

impl MembershipRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out the generation for a newly connected session.
    pub fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Records `session_id` as the session representing `user_id`.
    ///
    /// Returns `false` when a newer session already represents the user; the
    /// session still resolves to the user, but the user keeps pointing at the
    /// newer session.
    pub fn register_session(&self, user_id: UserId, session_id: SessionId, generation: u64) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());

        // A session re-announcing as someone else drops its old claim.
        if let Some(previous) = inner.by_session.insert(session_id, user_id) {
            if previous != user_id
                && inner
                    .by_user
                    .get(&previous)
                    .is_some_and(|e| e.session_id == session_id)
            {
                inner.by_user.remove(&previous);
            }
        }

        match inner.by_user.get(&user_id) {
            Some(current) if current.generation > generation => false,
            _ => {
                inner.by_user.insert(
                    user_id,
                    SessionEntry {
                        session_id,
                        generation,
                    },
                );
                true
            }
        }
    }

    /// Forgets a session. No-op when the session never joined.
    ///
    /// Returns the user the session had announced.
    pub fn unregister_session(&self, session_id: SessionId) -> Option<UserId> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let user_id = inner.by_session.remove(&session_id)?;
        if inner
            .by_user
            .get(&user_id)
            .is_some_and(|e| e.session_id == session_id)
        {
            inner.by_user.remove(&user_id);
        }
        Some(user_id)
    }

    /// The user a session announced, if any.
    pub fn find_user_by_session(&self, session_id: SessionId) -> Option<UserId> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.by_session.get(&session_id).copied()
    }

    /// The session currently representing a user.
    pub fn find_session_by_user(&self, user_id: UserId) -> Option<SessionEntry> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.by_user.get(&user_id).copied()
    }

    /// Number of users with a live session.
    pub fn user_count(&self) -> usize {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.by_user.len()
    }
}
