//! Two-party conversation use cases.

pub mod service;

pub use service::ConversationService;
