//! Persistence gateway contracts and backend selection.
//!
//! Everything above this crate talks to storage through [`ChatStore`],
//! which bundles the per-entity store traits. Backends must give each
//! operation its own atomicity; callers never open cross-call
//! transactions.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use chathub_core::config::DatabaseConfig;
use chathub_core::error::AppError;
use chathub_core::result::AppResult;
use chathub_entity::conversation::{Conversation, ParticipantPair};
use chathub_entity::message::{CreateMessage, Message, MessageView};
use chathub_entity::room::{ChatRoom, CreateRoom};
use chathub_entity::topic::Topic;
use chathub_entity::user::{CreateUser, UpdateUser, User};

/// User account storage.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user. Fails with `Conflict` when the email is taken.
    async fn create_user(&self, data: CreateUser) -> AppResult<User>;

    /// Find a user by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by email, ignoring case.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Resolve several users at once. Unknown IDs are skipped.
    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<User>>;

    /// Apply a partial profile update.
    async fn update_profile(&self, id: Uuid, data: UpdateUser) -> AppResult<User>;

    /// Every user except `except`, sorted by first name.
    async fn list_others(&self, except: Uuid) -> AppResult<Vec<User>>;
}

/// Chat room storage.
#[async_trait]
pub trait RoomStore: Send + Sync {
    /// Insert a room with its creator as the first participant.
    async fn create_room(&self, data: CreateRoom) -> AppResult<ChatRoom>;

    /// Find a room with its participants.
    async fn find_room(&self, id: Uuid) -> AppResult<Option<ChatRoom>>;

    /// All rooms, newest first.
    async fn list_rooms(&self) -> AppResult<Vec<ChatRoom>>;

    /// Add a participant. Adding an existing participant changes nothing.
    async fn add_participant(&self, room_id: Uuid, user_id: Uuid) -> AppResult<ChatRoom>;

    /// Remove a participant. Removing a non-participant changes nothing.
    async fn remove_participant(&self, room_id: Uuid, user_id: Uuid) -> AppResult<ChatRoom>;

    /// Delete a room and every message scoped to it.
    ///
    /// Returns `false` if the room did not exist.
    async fn delete_room(&self, id: Uuid) -> AppResult<bool>;
}

/// Two-party conversation storage.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Return the conversation for the pair, creating it on first contact.
    ///
    /// Concurrent calls for the same pair resolve to one conversation.
    async fn get_or_create_conversation(&self, pair: ParticipantPair) -> AppResult<Conversation>;

    /// Find a conversation by ID.
    async fn find_conversation(&self, id: Uuid) -> AppResult<Option<Conversation>>;

    /// Conversations the user takes part in, most recently active first.
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Conversation>>;

    /// Delete a conversation and its messages. Returns `false` if absent.
    async fn delete_conversation(&self, id: Uuid) -> AppResult<bool>;
}

/// Message history storage.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Store a message under its topic.
    ///
    /// For conversations the insert and the `last_message_id` update are
    /// one atomic step. Fails with `NotFound` if the topic is gone.
    async fn create_message(&self, data: CreateMessage) -> AppResult<Message>;

    /// Find a message with its sender resolved.
    async fn find_message(&self, id: Uuid) -> AppResult<Option<MessageView>>;

    /// History of a topic, oldest first.
    async fn list_messages(&self, topic: Topic) -> AppResult<Vec<MessageView>>;
}

/// The full persistence gateway.
#[async_trait]
pub trait ChatStore:
    UserStore + RoomStore + ConversationStore + MessageStore + std::fmt::Debug + 'static
{
    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Short backend name for logs and health output.
    fn backend_name(&self) -> &'static str;
}

/// Builds the configured [`ChatStore`] backend.
#[derive(Debug)]
pub struct StoreManager;

impl StoreManager {
    /// Connect to the backend named by `config.provider`.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Arc<dyn ChatStore>> {
        let store: Arc<dyn ChatStore> = match config.provider.as_str() {
            "postgres" => {
                info!("Initializing PostgreSQL chat store");
                let pool = crate::connection::open_pool(config).await?;
                Arc::new(crate::repositories::PgStore::new(pool))
            }
            "memory" => {
                info!("Initializing in-memory chat store");
                Arc::new(crate::memory::MemoryStore::new())
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown database provider: '{other}'. Supported: postgres, memory"
                )));
            }
        };

        Ok(store)
    }
}
