//! Two-party conversation entities.

pub mod model;

pub use model::{Conversation, ConversationDetail, ParticipantPair};
