//! Event dispatch for live sessions.
//!
//! Every inbound frame is handled to completion for its session before
//! the next one is read. Sends to the same topic are serialized by a
//! per-topic lock that is held across persistence and fan-out, so all
//! subscribers see messages in the order they were stored.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use chathub_auth::AccessChecker;
use chathub_core::config::RealtimeConfig;
use chathub_core::error::AppError;
use chathub_core::result::AppResult;
use chathub_core::types::{SessionId, UserId};
use chathub_entity::message::MessageView;
use chathub_entity::topic::{Topic, TopicKind};
use chathub_service::MessageService;

use crate::channel::ChannelRegistry;
use crate::connection::{OutboundFrame, SessionHandle, SessionPool};
use crate::message::types::{InboundEvent, OutboundEvent};
use crate::message::validator;
use crate::metrics::BrokerMetrics;
use crate::registry::MembershipRegistry;

const ROOM_SEND_FAILED: &str = "Failed to send message";
const DIRECT_SEND_FAILED: &str = "Failed to send direct message";

/// Routes session events to the registry, the channels and the store.
#[derive(Debug)]
pub struct Broker {
    config: RealtimeConfig,
    pool: SessionPool,
    channels: Arc<ChannelRegistry>,
    registry: Arc<MembershipRegistry>,
    access: Arc<AccessChecker>,
    messages: MessageService,
    metrics: Arc<BrokerMetrics>,
    topic_locks: DashMap<Topic, Arc<Mutex<()>>>,
    shutdown: CancellationToken,
}

impl Broker {
    /// Creates a broker. Sessions are cancelled when `shutdown` is.
    pub fn new(
        config: RealtimeConfig,
        channels: Arc<ChannelRegistry>,
        registry: Arc<MembershipRegistry>,
        access: Arc<AccessChecker>,
        messages: MessageService,
        metrics: Arc<BrokerMetrics>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            config,
            pool: SessionPool::new(),
            channels,
            registry,
            access,
            messages,
            metrics,
            topic_locks: DashMap::new(),
            shutdown,
        }
    }

    /// Accepts a new session.
    ///
    /// `token_user` is the user proven by the upgrade token; when present,
    /// `join` may only announce that user. Returns the handle and the
    /// receiver the socket writer drains.
    pub fn connect(
        &self,
        token_user: Option<UserId>,
    ) -> (Arc<SessionHandle>, mpsc::Receiver<OutboundFrame>) {
        let (tx, rx) = mpsc::channel(self.config.session_buffer_size.max(1));
        let handle = Arc::new(SessionHandle::new(
            self.registry.next_generation(),
            token_user,
            tx,
            self.shutdown.child_token(),
        ));

        self.pool.add(handle.clone());
        self.metrics.connection_opened();

        info!(
            session_id = %handle.id,
            generation = handle.generation,
            token_user = ?token_user,
            "Session connected"
        );

        (handle, rx)
    }

    /// Drops a session from the pool, every broadcast group and the registry.
    ///
    /// Messages it already persisted stay stored. Unknown sessions are ignored.
    pub fn disconnect(&self, session_id: SessionId) {
        let Some(handle) = self.pool.remove(&session_id) else {
            return;
        };
        handle.close();

        let topics = self.channels.unsubscribe_all(session_id);
        let user_id = self.registry.unregister_session(session_id);
        self.metrics.connection_closed();

        info!(
            session_id = %session_id,
            user_id = ?user_id,
            topics,
            "Session disconnected"
        );
    }

    /// Validates, decodes and dispatches one raw inbound frame.
    pub async fn handle_frame(&self, session_id: SessionId, raw: &str) {
        let Some(handle) = self.pool.get(&session_id) else {
            warn!(session_id = %session_id, "Frame from unknown session");
            return;
        };

        handle.touch();
        self.metrics.frame_received();

        match validator::decode(raw, self.config.max_frame_bytes) {
            Ok(event) => self.dispatch(&handle, event).await,
            Err(err) => {
                debug!(session_id = %session_id, error = %err, "Rejected inbound frame");
                handle.send_event(&OutboundEvent::error(&err));
            }
        }
    }

    /// Handles one decoded event. Failures go to this session only.
    pub async fn dispatch(&self, handle: &SessionHandle, event: InboundEvent) {
        let outcome = match event {
            InboundEvent::Join(payload) => parse_user(&payload.user_id)
                .and_then(|user_id| self.join(handle, user_id))
                .map_err(|e| OutboundEvent::error(&e)),
            InboundEvent::JoinRoom(id) => self
                .join_topic(handle, TopicKind::Room, &id)
                .await
                .map_err(|e| OutboundEvent::error(&e)),
            InboundEvent::JoinConversation(id) => self
                .join_topic(handle, TopicKind::Conversation, &id)
                .await
                .map_err(|e| OutboundEvent::error(&e)),
            InboundEvent::LeaveRoom(id) => self
                .leave_topic(handle, TopicKind::Room, &id)
                .map_err(|e| OutboundEvent::error(&e)),
            InboundEvent::LeaveConversation(id) => self
                .leave_topic(handle, TopicKind::Conversation, &id)
                .map_err(|e| OutboundEvent::error(&e)),
            InboundEvent::SendMessage(payload) => self
                .send_from_session(
                    handle,
                    TopicKind::Room,
                    &payload.room_id,
                    &payload.message,
                    payload.sender.as_deref(),
                )
                .await
                .map(drop)
                .map_err(|e| send_failure(&e, ROOM_SEND_FAILED)),
            InboundEvent::SendDirectMessage(payload) => self
                .send_from_session(
                    handle,
                    TopicKind::Conversation,
                    &payload.conversation_id,
                    &payload.message,
                    None,
                )
                .await
                .map(drop)
                .map_err(|e| send_failure(&e, DIRECT_SEND_FAILED)),
        };

        if let Err(event) = outcome {
            handle.send_event(&event);
        }
    }

    /// Identifies the session as `user_id` and records it in the registry.
    ///
    /// Re-joining overwrites. A session holding a token may only announce
    /// the token's user.
    pub fn join(&self, handle: &SessionHandle, user_id: UserId) -> AppResult<()> {
        match handle.token_user {
            Some(token_user) if token_user != user_id => {
                return Err(AppError::authorization(
                    "Session token does not match the announced user",
                ));
            }
            None if self.config.require_token => {
                return Err(AppError::authentication("Session is not authenticated"));
            }
            _ => {}
        }

        handle.identify(user_id);
        if !self
            .registry
            .register_session(user_id, handle.id, handle.generation)
        {
            debug!(
                session_id = %handle.id,
                user_id = %user_id,
                "A newer session already represents this user"
            );
        }

        info!(session_id = %handle.id, user_id = %user_id, "Session joined");
        Ok(())
    }

    /// Adds the session to a topic's broadcast group.
    async fn join_topic(&self, handle: &SessionHandle, kind: TopicKind, id: &str) -> AppResult<()> {
        let topic = Topic::parse(kind, id)?;
        self.subscribe(handle, topic).await
    }

    /// Subscribes a session to `topic`.
    ///
    /// With `authorize_subscriptions` on, only identified participants of
    /// an existing topic are admitted.
    pub async fn subscribe(&self, handle: &SessionHandle, topic: Topic) -> AppResult<()> {
        if self.channels.is_subscribed(&topic, handle.id) {
            return Ok(());
        }

        let max = self.config.max_subscriptions_per_session;
        if self.channels.subscription_count(handle.id) >= max {
            return Err(AppError::validation(format!(
                "Maximum subscriptions ({max}) reached"
            )));
        }

        if self.config.authorize_subscriptions {
            let user_id = handle
                .user_id()
                .ok_or_else(|| AppError::authentication("Join before subscribing to topics"))?;
            self.access.require_access(user_id, topic).await?;
        }

        self.channels.subscribe(topic, handle.id);
        debug!(session_id = %handle.id, topic = %topic, "Subscribed");
        Ok(())
    }

    fn leave_topic(&self, handle: &SessionHandle, kind: TopicKind, id: &str) -> AppResult<()> {
        let topic = Topic::parse(kind, id)?;
        self.unsubscribe(handle, topic);
        Ok(())
    }

    /// Removes a session from `topic`'s group. No-op if not a member.
    pub fn unsubscribe(&self, handle: &SessionHandle, topic: Topic) {
        if self.channels.unsubscribe(topic, handle.id) {
            debug!(session_id = %handle.id, topic = %topic, "Unsubscribed");
        }
    }

    async fn send_from_session(
        &self,
        handle: &SessionHandle,
        kind: TopicKind,
        id: &str,
        content: &str,
        claimed_sender: Option<&str>,
    ) -> AppResult<MessageView> {
        let topic = Topic::parse(kind, id)?;
        let sender = self.resolve_sender(handle, claimed_sender)?;
        self.send(sender, topic, content).await
    }

    fn resolve_sender(&self, handle: &SessionHandle, claimed: Option<&str>) -> AppResult<UserId> {
        let claimed = claimed.map(parse_user).transpose()?;
        match (handle.user_id(), claimed) {
            (Some(joined), Some(claimed)) if claimed != joined => Err(AppError::authorization(
                "Sender does not match the joined user",
            )),
            (Some(joined), _) => Ok(joined),
            (None, Some(claimed)) if !self.config.require_token && handle.token_user.is_none() => {
                Ok(claimed)
            }
            (None, _) => Err(AppError::authentication("Join before sending messages")),
        }
    }

    /// Persists a message and delivers it to every current subscriber of
    /// `topic`, the sender's own sessions included.
    ///
    /// This is the only write path for messages, whether they arrive over
    /// a socket or through the REST facade. On failure nothing is
    /// broadcast and nothing is retried.
    pub async fn send(&self, sender: UserId, topic: Topic, content: &str) -> AppResult<MessageView> {
        if self.config.authorize_subscriptions {
            self.access.require_access(sender, topic).await?;
        }

        let lock = self
            .topic_locks
            .entry(topic)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let result = {
            let _guard = lock.lock().await;
            match self.messages.persist(sender, topic, content).await {
                Ok(view) => {
                    self.metrics.message_persisted();
                    self.publish(topic, &view);
                    Ok(view)
                }
                Err(err) => {
                    if !err.is_client_error() {
                        self.metrics.persistence_failed();
                    }
                    Err(err)
                }
            }
        };

        drop(lock);
        self.topic_locks
            .remove_if(&topic, |_, lock| Arc::strong_count(lock) == 1);

        result
    }

    /// Fans a stored message out to the topic's broadcast group.
    ///
    /// Never waits on a recipient. Returns the number of sessions the
    /// message was queued for.
    pub fn publish(&self, topic: Topic, view: &MessageView) -> usize {
        let text = match serde_json::to_string(&OutboundEvent::NewMessage(view.clone())) {
            Ok(text) => text,
            Err(e) => {
                error!(topic = %topic, error = %e, "Failed to serialize message");
                return 0;
            }
        };

        let (mut delivered, mut dropped) = (0u64, 0u64);
        for session_id in self.channels.subscribers(&topic) {
            match self.pool.get(&session_id) {
                Some(handle) if handle.send(OutboundFrame::Text(text.clone())) => delivered += 1,
                _ => dropped += 1,
            }
        }

        self.metrics.fanned_out(delivered, dropped);
        debug!(
            topic = %topic,
            message_id = %view.id,
            delivered,
            dropped,
            "Message fanned out"
        );
        delivered as usize
    }

    /// Disconnects every session.
    pub fn close_all(&self) {
        let sessions = self.pool.all();
        for handle in &sessions {
            self.disconnect(handle.id);
        }
        info!(count = sessions.len(), "All sessions closed");
    }

    /// Looks up a live session.
    pub fn session(&self, session_id: SessionId) -> Option<Arc<SessionHandle>> {
        self.pool.get(&session_id)
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.pool.len()
    }

    /// Broker settings.
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }
}

fn parse_user(raw: &str) -> AppResult<UserId> {
    raw.parse()
        .map_err(|_| AppError::validation(format!("Invalid user id: '{raw}'")))
}

/// Caller mistakes keep their message; server-side failures are reported
/// with a fixed one so store details never reach the client.
fn send_failure(err: &AppError, message: &str) -> OutboundEvent {
    if err.is_client_error() {
        OutboundEvent::error(err)
    } else {
        OutboundEvent::error_with(err, message)
    }
}
