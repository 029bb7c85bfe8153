//! Route handlers, one module per resource.

pub mod chatrooms;
pub mod conversations;
pub mod health;
pub mod users;
pub mod ws;
