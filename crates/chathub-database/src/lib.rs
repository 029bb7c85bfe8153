//! # chathub-database
//!
//! The persistence gateway. Defines the store traits the rest of ChatHub
//! consumes and two backends for them: PostgreSQL via `sqlx` and an
//! in-memory store for tests and single-process runs.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::open_pool;
pub use memory::MemoryStore;
pub use repositories::PgStore;
pub use store::{ChatStore, ConversationStore, MessageStore, RoomStore, StoreManager, UserStore};
