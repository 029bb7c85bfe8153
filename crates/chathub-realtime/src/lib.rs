//! # chathub-realtime
//!
//! The live half of ChatHub. Sessions connect over a socket, announce who
//! they are, subscribe to rooms and conversations, and receive every
//! message sent to those topics while they stay subscribed.
//!
//! - [`registry::MembershipRegistry`] maps users to their current session.
//! - [`channel::ChannelRegistry`] holds the broadcast group of each topic.
//! - [`broker::Broker`] dispatches inbound events, persists sends and fans
//!   them out in per-topic order.
//! - [`server::RealtimeEngine`] owns all of the above and shuts it down.

pub mod broker;
pub mod channel;
pub mod connection;
pub mod message;
pub mod metrics;
pub mod registry;
pub mod server;

pub use broker::Broker;
pub use channel::ChannelRegistry;
pub use connection::{OutboundFrame, SessionHandle, SessionState};
pub use registry::MembershipRegistry;
pub use server::RealtimeEngine;
