//! Stand-in platform sinks for running the bot without a chat platform.
//!
//! A real deployment replaces these with an adapter wrapping the platform
//! client; the control loops only ever see the two traits.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use hearthbot_core::error::Result;
use hearthbot_core::traits::{ChannelControl, Messenger};

/// Keeps slowmode values in memory and logs every change.
#[derive(Default)]
pub struct LocalControl {
    delays: Mutex<HashMap<String, u32>>,
}

#[async_trait]
impl ChannelControl for LocalControl {
    async fn slowmode_delay(&self, channel_id: &str) -> Result<u32> {
        Ok(self
            .delays
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(channel_id)
            .copied()
            .unwrap_or(0))
    }

    async fn set_slowmode_delay(&self, channel_id: &str, seconds: u32) -> Result<()> {
        self.delays
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(channel_id.to_string(), seconds);
        tracing::info!("[local] slowmode for #{channel_id} set to {seconds}s");
        Ok(())
    }
}

/// Prints announcements to the log instead of a channel.
#[derive(Default)]
pub struct LocalMessenger;

#[async_trait]
impl Messenger for LocalMessenger {
    async fn send_message(&self, text: &str) -> Result<()> {
        tracing::info!("[local] announcement:\n{text}");
        Ok(())
    }
}
