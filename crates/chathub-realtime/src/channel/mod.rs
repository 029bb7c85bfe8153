//! Broadcast groups, one per topic.

pub mod registry;
pub mod subscription;

pub use registry::ChannelRegistry;
pub use subscription::SubscriptionTracker;
