//! # chathub-service
//!
//! Business logic for ChatHub. Each service wraps the chat store and the
//! auth collaborators behind use-case methods the REST facade and the
//! real-time broker call.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod context;
pub mod conversation;
pub mod message;
pub mod room;
pub mod user;

pub use context::RequestContext;
pub use conversation::ConversationService;
pub use message::MessageService;
pub use room::RoomService;
pub use user::UserService;
