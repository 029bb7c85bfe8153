//! Direct conversation operations.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use chathub_auth::AccessChecker;
use chathub_core::error::AppError;
use chathub_core::result::AppResult;
use chathub_core::types::{ConversationId, UserId};
use chathub_database::ChatStore;
use chathub_entity::conversation::{Conversation, ConversationDetail};
use chathub_entity::message::MessageView;
use chathub_entity::topic::Topic;
use chathub_entity::user::UserSummary;

use crate::context::RequestContext;

/// Manages two-party conversations.
#[derive(Debug, Clone)]
pub struct ConversationService {
    store: Arc<dyn ChatStore>,
    access: Arc<AccessChecker>,
}

impl ConversationService {
    /// Creates a new conversation service.
    pub fn new(store: Arc<dyn ChatStore>, access: Arc<AccessChecker>) -> Self {
        Self { store, access }
    }

    /// The caller's conversations, most recently active first.
    pub async fn list(&self, ctx: &RequestContext) -> AppResult<Vec<ConversationDetail>> {
        let conversations = self.store.list_for_user(ctx.user_id.into_uuid()).await?;
        self.details(conversations).await
    }

    /// Returns the conversation between the caller and `other`, creating it
    /// on first contact.
    pub async fn get_or_create(
        &self,
        ctx: &RequestContext,
        other: UserId,
    ) -> AppResult<ConversationDetail> {
        if other == ctx.user_id {
            return Err(AppError::validation(
                "Cannot start a conversation with yourself",
            ));
        }
        if self.store.find_by_id(other.into_uuid()).await?.is_none() {
            return Err(AppError::not_found("User not found"));
        }

        let pair =
            Conversation::validate_participants(&[ctx.user_id.into_uuid(), other.into_uuid()])?;
        let conversation = self.store.get_or_create_conversation(pair).await?;
        info!(
            conversation_id = %conversation.id,
            user_id = %ctx.user_id,
            "Conversation opened"
        );
        self.detail(conversation).await
    }

    /// A single conversation. Participants only.
    pub async fn get(
        &self,
        ctx: &RequestContext,
        id: ConversationId,
    ) -> AppResult<ConversationDetail> {
        self.require_participant(ctx, id).await?;
        let conversation = self
            .store
            .find_conversation(id.into_uuid())
            .await?
            .ok_or_else(conversation_not_found)?;
        self.detail(conversation).await
    }

    /// Conversation history, oldest first. Participants only.
    pub async fn messages(
        &self,
        ctx: &RequestContext,
        id: ConversationId,
    ) -> AppResult<Vec<MessageView>> {
        self.require_participant(ctx, id).await?;
        self.store.list_messages(Topic::Conversation(id)).await
    }

    /// Deletes the conversation and its history. Any participant may.
    pub async fn delete(&self, ctx: &RequestContext, id: ConversationId) -> AppResult<()> {
        self.access
            .require_delete(ctx.user_id, Topic::Conversation(id))
            .await?;
        if !self.store.delete_conversation(id.into_uuid()).await? {
            return Err(conversation_not_found());
        }
        info!(conversation_id = %id, user_id = %ctx.user_id, "Conversation deleted");
        Ok(())
    }

    /// Fails unless the caller is one of the two participants.
    pub async fn require_participant(
        &self,
        ctx: &RequestContext,
        id: ConversationId,
    ) -> AppResult<()> {
        self.access
            .require_access(ctx.user_id, Topic::Conversation(id))
            .await
    }

    async fn detail(&self, conversation: Conversation) -> AppResult<ConversationDetail> {
        let mut details = self.details(vec![conversation]).await?;
        details.pop().ok_or_else(conversation_not_found)
    }

    async fn details(&self, conversations: Vec<Conversation>) -> AppResult<Vec<ConversationDetail>> {
        let mut ids: Vec<Uuid> = conversations
            .iter()
            .flat_map(|c| c.participants())
            .collect();
        ids.sort_unstable();
        ids.dedup();

        let users: HashMap<Uuid, UserSummary> = self
            .store
            .find_many(&ids)
            .await?
            .iter()
            .map(|u| (u.id, u.summary()))
            .collect();

        let mut details = Vec::with_capacity(conversations.len());
        for conversation in conversations {
            let last_message = match conversation.last_message_id {
                Some(message_id) => self.store.find_message(message_id).await?,
                None => None,
            };
            details.push(ConversationDetail {
                id: conversation.id,
                participants: conversation
                    .participants()
                    .iter()
                    .filter_map(|id| users.get(id).cloned())
                    .collect(),
                last_message,
                created_at: conversation.created_at,
            });
        }
        Ok(details)
    }
}

fn conversation_not_found() -> AppError {
    AppError::not_found("Conversation not found")
}
