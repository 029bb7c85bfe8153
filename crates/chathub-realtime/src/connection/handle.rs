//! A single live session.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use chathub_core::types::{SessionId, UserId};

use super::state::SessionState;
use crate::message::types::OutboundEvent;

/// What the socket writer should put on the wire next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    /// A serialized event.
    Text(String),
    /// Keepalive ping.
    Ping,
}

/// Handle to one connected session.
///
/// The socket writer drains the receiving half of `sender`; everything
/// else pushes into it without waiting.
#[derive(Debug)]
pub struct SessionHandle {
    /// Session ID.
    pub id: SessionId,
    /// Connection order, used to resolve reconnect races.
    pub generation: u64,
    /// User proven by the upgrade token, if one was presented.
    pub token_user: Option<UserId>,
    /// When the socket was accepted.
    pub connected_at: DateTime<Utc>,
    sender: mpsc::Sender<OutboundFrame>,
    state: Mutex<SessionState>,
    last_activity: Mutex<DateTime<Utc>>,
    alive: AtomicBool,
    cancel: CancellationToken,
}

impl SessionHandle {
    /// Creates a handle. `cancel` stops the session's socket tasks.
    pub fn new(
        generation: u64,
        token_user: Option<UserId>,
        sender: mpsc::Sender<OutboundFrame>,
        cancel: CancellationToken,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            generation,
            token_user,
            connected_at: now,
            sender,
            state: Mutex::new(SessionState::Anonymous),
            last_activity: Mutex::new(now),
            alive: AtomicBool::new(true),
            cancel,
        }
    }

    /// Queues a frame without waiting.
    ///
    /// A full buffer drops the frame. A closed buffer marks the session dead.
    pub fn send(&self, frame: OutboundFrame) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(frame) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(session_id = %self.id, "Session buffer full, dropping frame");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!(session_id = %self.id, "Session buffer closed, marking dead");
                self.mark_dead();
                false
            }
        }
    }

    /// Serializes and queues an event.
    pub fn send_event(&self, event: &OutboundEvent) -> bool {
        match serde_json::to_string(event) {
            Ok(text) => self.send(OutboundFrame::Text(text)),
            Err(e) => {
                error!(session_id = %self.id, error = %e, "Failed to serialize outbound event");
                false
            }
        }
    }

    /// Current identity state.
    pub fn state(&self) -> SessionState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The joined user, if any.
    pub fn user_id(&self) -> Option<UserId> {
        self.state().user_id()
    }

    /// Moves the session to `Identified(user_id)`.
    pub fn identify(&self, user_id: UserId) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = SessionState::Identified(user_id);
    }

    /// Records inbound traffic.
    pub fn touch(&self) {
        *self.last_activity.lock().unwrap_or_else(|e| e.into_inner()) = Utc::now();
    }

    /// Time since the last inbound traffic.
    pub fn idle_for(&self) -> Duration {
        let last = *self.last_activity.lock().unwrap_or_else(|e| e.into_inner());
        (Utc::now() - last).to_std().unwrap_or_default()
    }

    /// Whether frames can still be delivered.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Stops accepting frames.
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Marks the session dead and cancels its socket tasks.
    pub fn close(&self) {
        self.mark_dead();
        self.cancel.cancel();
    }

    /// Resolves once the session is closed or the engine shuts down.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(buffer: usize) -> (SessionHandle, mpsc::Receiver<OutboundFrame>) {
        let (tx, rx) = mpsc::channel(buffer);
        (SessionHandle::new(1, None, tx, CancellationToken::new()), rx)
    }

    #[test]
    fn test_full_buffer_drops_but_stays_alive() {
        let (session, _rx) = handle(1);
        assert!(session.send(OutboundFrame::Ping));
        assert!(!session.send(OutboundFrame::Ping));
        assert!(session.is_alive());
    }

    #[test]
    fn test_closed_buffer_marks_dead() {
        let (session, rx) = handle(4);
        drop(rx);
        assert!(!session.send(OutboundFrame::Ping));
        assert!(!session.is_alive());
    }

    #[test]
    fn test_identify_transitions_state() {
        let (session, _rx) = handle(4);
        assert_eq!(session.state(), SessionState::Anonymous);
        let user = UserId::new();
        session.identify(user);
        assert_eq!(session.user_id(), Some(user));
        assert!(session.state().is_identified());
    }

    #[test]
    fn test_close_cancels() {
        let (session, _rx) = handle(4);
        let token = session.cancellation();
        session.close();
        assert!(token.is_cancelled());
        assert!(!session.send(OutboundFrame::Ping));
    }
}
