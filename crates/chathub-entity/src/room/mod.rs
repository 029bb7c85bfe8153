//! Chat room entities.

pub mod model;

pub use model::{ChatRoom, CreateRoom, RoomDetail};
