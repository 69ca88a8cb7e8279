//! Runtime-side port implementations.

pub mod link_bridge;
pub mod observability;

pub use link_bridge::{ChannelLinkSdk, LinkRequest};
pub use observability::SentryObservability;
