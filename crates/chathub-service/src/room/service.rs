//! Chat room operations.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use chathub_auth::AccessChecker;
use chathub_core::error::AppError;
use chathub_core::result::AppResult;
use chathub_core::types::RoomId;
use chathub_database::ChatStore;
use chathub_entity::message::MessageView;
use chathub_entity::room::{ChatRoom, CreateRoom, RoomDetail};
use chathub_entity::topic::Topic;
use chathub_entity::user::UserSummary;

use crate::context::RequestContext;

/// Manages chat rooms and their participants.
#[derive(Debug, Clone)]
pub struct RoomService {
    store: Arc<dyn ChatStore>,
    access: Arc<AccessChecker>,
}

impl RoomService {
    /// Creates a new room service.
    pub fn new(store: Arc<dyn ChatStore>, access: Arc<AccessChecker>) -> Self {
        Self { store, access }
    }

    /// All rooms, newest first.
    pub async fn list_rooms(&self) -> AppResult<Vec<RoomDetail>> {
        let rooms = self.store.list_rooms().await?;
        self.details(rooms).await
    }

    /// Creates a room owned by the caller.
    pub async fn create_room(&self, ctx: &RequestContext, name: &str) -> AppResult<RoomDetail> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Chat room name is required"));
        }

        let room = self
            .store
            .create_room(CreateRoom {
                name: name.to_string(),
                creator_id: ctx.user_id.into_uuid(),
            })
            .await?;

        info!(room_id = %room.id, creator = %ctx.user_id, "Chat room created");
        self.detail(room).await
    }

    /// A single room with its participants.
    pub async fn get_room(&self, room_id: RoomId) -> AppResult<RoomDetail> {
        let room = self
            .store
            .find_room(room_id.into_uuid())
            .await?
            .ok_or_else(room_not_found)?;
        self.detail(room).await
    }

    /// Adds the caller to the room. Joining twice is harmless.
    pub async fn join_room(&self, ctx: &RequestContext, room_id: RoomId) -> AppResult<RoomDetail> {
        let room = self
            .store
            .add_participant(room_id.into_uuid(), ctx.user_id.into_uuid())
            .await?;
        info!(room_id = %room_id, user_id = %ctx.user_id, "Joined chat room");
        self.detail(room).await
    }

    /// Removes the caller from the room.
    pub async fn leave_room(&self, ctx: &RequestContext, room_id: RoomId) -> AppResult<()> {
        self.store
            .remove_participant(room_id.into_uuid(), ctx.user_id.into_uuid())
            .await?;
        info!(room_id = %room_id, user_id = %ctx.user_id, "Left chat room");
        Ok(())
    }

    /// Deletes the room and its history. Creator only.
    pub async fn delete_room(&self, ctx: &RequestContext, room_id: RoomId) -> AppResult<()> {
        let topic = Topic::Room(room_id);
        self.access.require_delete(ctx.user_id, topic).await?;

        if !self.store.delete_room(room_id.into_uuid()).await? {
            return Err(room_not_found());
        }
        info!(room_id = %room_id, user_id = %ctx.user_id, "Chat room deleted");
        Ok(())
    }

    /// Room history, oldest first.
    ///
    /// A room that does not exist (or was deleted) has an empty history;
    /// an existing room is readable by participants only.
    pub async fn messages(&self, ctx: &RequestContext, room_id: RoomId) -> AppResult<Vec<MessageView>> {
        let topic = Topic::Room(room_id);
        if self.store.find_room(room_id.into_uuid()).await?.is_none() {
            return Ok(Vec::new());
        }
        self.access.require_access(ctx.user_id, topic).await?;
        self.store.list_messages(topic).await
    }

    async fn detail(&self, room: ChatRoom) -> AppResult<RoomDetail> {
        let mut details = self.details(vec![room]).await?;
        details.pop().ok_or_else(room_not_found)
    }

    /// Resolves creators and participants with a single user lookup.
    async fn details(&self, rooms: Vec<ChatRoom>) -> AppResult<Vec<RoomDetail>> {
        let mut ids: Vec<Uuid> = rooms
            .iter()
            .flat_map(|r| std::iter::once(r.creator_id).chain(r.participant_ids.iter().copied()))
            .collect();
        ids.sort_unstable();
        ids.dedup();

        let users: HashMap<Uuid, UserSummary> = self
            .store
            .find_many(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id, name_only(u.summary())))
            .collect();

        Ok(rooms
            .into_iter()
            .map(|room| RoomDetail {
                id: room.id,
                creator: users
                    .get(&room.creator_id)
                    .cloned()
                    .unwrap_or_else(|| unknown_user(room.creator_id)),
                participants: room
                    .participant_ids
                    .iter()
                    .filter_map(|id| users.get(id).cloned())
                    .collect(),
                name: room.name,
                created_at: room.created_at,
            })
            .collect())
    }
}

fn room_not_found() -> AppError {
    AppError::not_found("Chat room not found")
}

fn name_only(summary: UserSummary) -> UserSummary {
    UserSummary {
        email: None,
        ..summary
    }
}

fn unknown_user(id: Uuid) -> UserSummary {
    UserSummary {
        id,
        first_name: String::new(),
        last_name: String::new(),
        email: None,
    }
}

#[cfg(test)]
mod tests {
    use chathub_core::error::ErrorKind;
    use chathub_core::types::UserId;
    use chathub_database::{MemoryStore, UserStore};
    use chathub_entity::user::CreateUser;

    use crate::message::MessageService;

    use super::*;

    struct Fixture {
        store: Arc<MemoryStore>,
        rooms: RoomService,
        messages: MessageService,
    }

    impl Fixture {
        fn new() -> Self {
            let store = Arc::new(MemoryStore::new());
            let access = Arc::new(AccessChecker::new(store.clone()));
            Self {
                rooms: RoomService::new(store.clone(), access),
                messages: MessageService::new(store.clone()),
                store,
            }
        }

        async fn user(&self, first: &str) -> RequestContext {
            let email = format!("{}@example.com", first.to_lowercase());
            let user = self
                .store
                .create_user(CreateUser {
                    first_name: first.into(),
                    last_name: "Tester".into(),
                    email: email.clone(),
                    password_hash: "hash".into(),
                })
                .await
                .unwrap();
            RequestContext::new(UserId::from_uuid(user.id), email)
        }
    }

    #[tokio::test]
    async fn test_create_room_includes_creator() {
        let f = Fixture::new();
        let alice = f.user("Alice").await;

        let room = f.rooms.create_room(&alice, "  general ").await.unwrap();
        assert_eq!(room.name, "general");
        assert_eq!(room.creator.first_name, "Alice");
        assert_eq!(room.participants.len(), 1);
        assert!(room.creator.email.is_none());

        let err = f.rooms.create_room(&alice, "   ").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_join_twice_and_leave() {
        let f = Fixture::new();
        let alice = f.user("Alice").await;
        let bob = f.user("Bob").await;
        let room = f.rooms.create_room(&alice, "general").await.unwrap();
        let room_id = RoomId::from_uuid(room.id);

        f.rooms.join_room(&bob, room_id).await.unwrap();
        let joined = f.rooms.join_room(&bob, room_id).await.unwrap();
        assert_eq!(joined.participants.len(), 2);

        f.rooms.leave_room(&bob, room_id).await.unwrap();
        let room = f.rooms.get_room(room_id).await.unwrap();
        assert_eq!(room.participants.len(), 1);
    }

    #[tokio::test]
    async fn test_only_creator_deletes_and_history_goes_with_it() {
        let f = Fixture::new();
        let alice = f.user("Alice").await;
        let bob = f.user("Bob").await;
        let room = f.rooms.create_room(&alice, "general").await.unwrap();
        let room_id = RoomId::from_uuid(room.id);
        f.rooms.join_room(&bob, room_id).await.unwrap();
        f.messages
            .persist(bob.user_id, Topic::Room(room_id), "hi")
            .await
            .unwrap();

        let err = f.rooms.delete_room(&bob, room_id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        f.rooms.delete_room(&alice, room_id).await.unwrap();
        assert!(f.rooms.messages(&alice, room_id).await.unwrap().is_empty());
        let err = f.rooms.get_room(room_id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_history_is_participant_only() {
        let f = Fixture::new();
        let alice = f.user("Alice").await;
        let mallory = f.user("Mallory").await;
        let room = f.rooms.create_room(&alice, "private").await.unwrap();
        let room_id = RoomId::from_uuid(room.id);
        f.messages
            .persist(alice.user_id, Topic::Room(room_id), "secret")
            .await
            .unwrap();

        let err = f.rooms.messages(&mallory, room_id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        let history = f.rooms.messages(&alice, room_id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].content, "secret");
    }

    #[tokio::test]
    async fn test_rooms_listed_newest_first() {
        let f = Fixture::new();
        let alice = f.user("Alice").await;
        f.rooms.create_room(&alice, "first").await.unwrap();
        f.rooms.create_room(&alice, "second").await.unwrap();

        let names: Vec<String> = f
            .rooms
            .list_rooms()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["second", "first"]);
    }
}
