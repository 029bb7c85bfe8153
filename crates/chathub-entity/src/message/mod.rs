//! Message entities.

pub mod model;

pub use model::{CreateMessage, Message, MessageRow, MessageView, normalize_content};
