//! Per-session identity state.

use serde::Serialize;

use chathub_core::types::UserId;

/// Whether a session has announced its user yet.
///
/// A session starts anonymous and becomes identified on `join`. There is
/// no way back; a later `join` only replaces the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "userId", rename_all = "snake_case")]
pub enum SessionState {
    /// No `join` received yet.
    #[default]
    Anonymous,
    /// Acting for this user.
    Identified(UserId),
}

impl SessionState {
    /// The identified user, if any.
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Anonymous => None,
            Self::Identified(user_id) => Some(*user_id),
        }
    }

    /// Whether `join` has been received.
    pub fn is_identified(&self) -> bool {
        matches!(self, Self::Identified(_))
    }
}
