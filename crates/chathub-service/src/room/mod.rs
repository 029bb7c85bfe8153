//! Chat room use cases.

pub mod service;

pub use service::RoomService;
