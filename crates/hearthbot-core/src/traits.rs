//! Traits implemented by the chat-platform adapter.
//!
//! The bot core never talks to the platform directly; the two control loops
//! only see these narrow sinks. The production adapter wraps the platform
//! client, tests use in-memory recorders.

use async_trait::async_trait;

use crate::error::Result;

/// Per-channel rate-limit control.
#[async_trait]
pub trait ChannelControl: Send + Sync {
    /// Read the currently enforced slowmode delay for a channel, in seconds.
    async fn slowmode_delay(&self, channel_id: &str) -> Result<u32>;

    /// Apply a new slowmode delay to a channel, in seconds.
    async fn set_slowmode_delay(&self, channel_id: &str, seconds: u32) -> Result<()>;
}

/// Outbound message delivery to the announcement channel.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_message(&self, text: &str) -> Result<()>;
}
