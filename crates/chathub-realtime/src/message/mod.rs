//! Socket event types and frame validation.

pub mod types;
pub mod validator;

pub use types::{ErrorPayload, InboundEvent, OutboundEvent};
