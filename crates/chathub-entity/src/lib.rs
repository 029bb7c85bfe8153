//! # chathub-entity
//!
//! Domain entity models for ChatHub. Structs that map to a database row
//! derive `sqlx::FromRow`; the `*View` and `*Summary` types are the JSON
//! shapes handed to REST callers and live sessions.

pub mod conversation;
pub mod message;
pub mod room;
pub mod topic;
pub mod user;

pub use conversation::Conversation;
pub use message::{Message, MessageView};
pub use room::ChatRoom;
pub use topic::{Topic, TopicKind};
pub use user::{User, UserSummary};
