//! In-process chat store.

pub mod store;

pub use store::MemoryStore;
