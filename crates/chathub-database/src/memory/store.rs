//! In-memory chat store behind a single `RwLock`.
//!
//! Every write takes the write lock for its whole duration, which gives
//! each trait operation the same atomicity the PostgreSQL backend gets
//! from a transaction. Meant for tests and single-process runs.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use chathub_core::error::AppError;
use chathub_core::result::AppResult;
use chathub_entity::conversation::{Conversation, ParticipantPair};
use chathub_entity::message::{CreateMessage, Message, MessageView};
use chathub_entity::room::{ChatRoom, CreateRoom};
use chathub_entity::topic::Topic;
use chathub_entity::user::{CreateUser, UpdateUser, User};

use crate::store::{ChatStore, ConversationStore, MessageStore, RoomStore, UserStore};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    /// Rooms keyed by id, with an insertion sequence for stable ordering.
    rooms: HashMap<Uuid, (u64, ChatRoom)>,
    conversations: HashMap<Uuid, (u64, Conversation)>,
    pairs: HashMap<ParticipantPair, Uuid>,
    /// Append-only history in persistence order.
    messages: Vec<Message>,
    next_seq: u64,
}

impl Tables {
    fn seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        let email = email.to_lowercase();
        self.users
            .values()
            .any(|u| Some(u.id) != except && u.email.to_lowercase() == email)
    }

    fn topic_exists(&self, topic: Topic) -> bool {
        match topic {
            Topic::Room(id) => self.rooms.contains_key(id.as_uuid()),
            Topic::Conversation(id) => self.conversations.contains_key(id.as_uuid()),
        }
    }

    fn view(&self, message: &Message) -> Option<MessageView> {
        let sender = self.users.get(&message.sender_id)?;
        Some(MessageView::new(message.clone(), sender.summary()))
    }

    /// Position of a message in the history, used as a recency key.
    fn position_of(&self, message_id: Uuid) -> Option<usize> {
        self.messages.iter().rposition(|m| m.id == message_id)
    }
}

/// Chat store holding all state in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate losing (or regaining) the backing store.
    ///
    /// While unavailable every operation fails with a `Transport` error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::transport("Persistence store is unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, data: CreateUser) -> AppResult<User> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if tables.email_taken(&data.email, None) {
            return Err(AppError::conflict("User already exists"));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            first_name: data.first_name,
            last_name: data.last_name,
            email: data.email,
            password_hash: data.password_hash,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        self.check_available()?;
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.check_available()?;
        let email = email.to_lowercase();
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email.to_lowercase() == email)
            .cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<User>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.users.get(id).cloned())
            .collect())
    }

    async fn update_profile(&self, id: Uuid, data: UpdateUser) -> AppResult<User> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if let Some(email) = &data.email {
            if tables.email_taken(email, Some(id)) {
                return Err(AppError::conflict("Email already in use"));
            }
        }
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("User not found"))?;
        if let Some(first_name) = data.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = data.last_name {
            user.last_name = last_name;
        }
        if let Some(email) = data.email {
            user.email = email;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn list_others(&self, except: Uuid) -> AppResult<Vec<User>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables
            .users
            .values()
            .filter(|u| u.id != except)
            .cloned()
            .collect();
        users.sort_by(|a, b| {
            a.first_name
                .cmp(&b.first_name)
                .then_with(|| a.last_name.cmp(&b.last_name))
        });
        Ok(users)
    }
}

#[async_trait]
impl RoomStore for MemoryStore {
    async fn create_room(&self, data: CreateRoom) -> AppResult<ChatRoom> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&data.creator_id) {
            return Err(AppError::not_found("User not found"));
        }
        let room = ChatRoom {
            id: Uuid::new_v4(),
            name: data.name,
            creator_id: data.creator_id,
            participant_ids: vec![data.creator_id],
            created_at: Utc::now(),
        };
        let seq = tables.seq();
        tables.rooms.insert(room.id, (seq, room.clone()));
        Ok(room)
    }

    async fn find_room(&self, id: Uuid) -> AppResult<Option<ChatRoom>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables.rooms.get(&id).map(|(_, room)| room.clone()))
    }

    async fn list_rooms(&self) -> AppResult<Vec<ChatRoom>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let mut rooms: Vec<&(u64, ChatRoom)> = tables.rooms.values().collect();
        rooms.sort_by_key(|(seq, room)| Reverse((room.created_at, *seq)));
        Ok(rooms.into_iter().map(|(_, room)| room.clone()).collect())
    }

    async fn add_participant(&self, room_id: Uuid, user_id: Uuid) -> AppResult<ChatRoom> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) {
            return Err(AppError::not_found("User not found"));
        }
        let (_, room) = tables
            .rooms
            .get_mut(&room_id)
            .ok_or_else(|| AppError::not_found("Chat room not found"))?;
        if !room.is_participant(user_id) {
            room.participant_ids.push(user_id);
        }
        Ok(room.clone())
    }

    async fn remove_participant(&self, room_id: Uuid, user_id: Uuid) -> AppResult<ChatRoom> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let (_, room) = tables
            .rooms
            .get_mut(&room_id)
            .ok_or_else(|| AppError::not_found("Chat room not found"))?;
        room.participant_ids.retain(|id| *id != user_id);
        Ok(room.clone())
    }

    async fn delete_room(&self, id: Uuid) -> AppResult<bool> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if tables.rooms.remove(&id).is_none() {
            return Ok(false);
        }
        let before = tables.messages.len();
        tables.messages.retain(|m| m.chat_room_id != Some(id));
        debug!(
            room_id = %id,
            removed = before - tables.messages.len(),
            "Deleted chat room with its messages"
        );
        Ok(true)
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn get_or_create_conversation(&self, pair: ParticipantPair) -> AppResult<Conversation> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if let Some((_, existing)) = tables
            .pairs
            .get(&pair)
            .and_then(|id| tables.conversations.get(id))
        {
            return Ok(existing.clone());
        }
        if !tables.users.contains_key(&pair.low) || !tables.users.contains_key(&pair.high) {
            return Err(AppError::not_found("User not found"));
        }
        let conversation = Conversation {
            id: Uuid::new_v4(),
            user_low: pair.low,
            user_high: pair.high,
            last_message_id: None,
            created_at: Utc::now(),
        };
        let seq = tables.seq();
        tables.pairs.insert(pair, conversation.id);
        tables
            .conversations
            .insert(conversation.id, (seq, conversation.clone()));
        Ok(conversation)
    }

    async fn find_conversation(&self, id: Uuid) -> AppResult<Option<Conversation>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables.conversations.get(&id).map(|(_, c)| c.clone()))
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Conversation>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let mut entries: Vec<(Option<usize>, u64, &Conversation)> = tables
            .conversations
            .values()
            .filter(|(_, c)| c.is_participant(user_id))
            .map(|(seq, c)| {
                let last = c.last_message_id.and_then(|id| tables.position_of(id));
                (last, *seq, c)
            })
            .collect();
        // Conversations with messages first (latest activity first), then
        // empty ones by creation, newest first.
        entries.sort_by(|a, b| {
            b.0.is_some()
                .cmp(&a.0.is_some())
                .then_with(|| b.0.cmp(&a.0))
                .then_with(|| (b.2.created_at, b.1).cmp(&(a.2.created_at, a.1)))
        });
        Ok(entries.into_iter().map(|(_, _, c)| c.clone()).collect())
    }

    async fn delete_conversation(&self, id: Uuid) -> AppResult<bool> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let Some((_, conversation)) = tables.conversations.remove(&id) else {
            return Ok(false);
        };
        tables.pairs.remove(&ParticipantPair {
            low: conversation.user_low,
            high: conversation.user_high,
        });
        tables.messages.retain(|m| m.conversation_id != Some(id));
        Ok(true)
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn create_message(&self, data: CreateMessage) -> AppResult<Message> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if !tables.topic_exists(data.topic()) {
            return Err(AppError::not_found("Topic not found"));
        }
        if !tables.users.contains_key(&data.sender_id()) {
            return Err(AppError::not_found("User not found"));
        }

        let message = Message {
            id: Uuid::new_v4(),
            conversation_id: data.conversation_id(),
            chat_room_id: data.chat_room_id(),
            sender_id: data.sender_id(),
            content: data.into_content(),
            timestamp: Utc::now(),
            read: false,
        };

        // Insert and link under the same write guard.
        if let Some(conversation_id) = message.conversation_id {
            if let Some((_, conversation)) = tables.conversations.get_mut(&conversation_id) {
                conversation.last_message_id = Some(message.id);
            }
        }
        tables.messages.push(message.clone());
        Ok(message)
    }

    async fn find_message(&self, id: Uuid) -> AppResult<Option<MessageView>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .messages
            .iter()
            .find(|m| m.id == id)
            .and_then(|m| tables.view(m)))
    }

    async fn list_messages(&self, topic: Topic) -> AppResult<Vec<MessageView>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .messages
            .iter()
            .filter(|m| m.topic() == Some(topic))
            .filter_map(|m| tables.view(m))
            .collect())
    }
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn health_check(&self) -> AppResult<bool> {
        Ok(!self.unavailable.load(Ordering::SeqCst))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
