//! Per-channel message tally for the current measurement cycle.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Records who spoke where since the last drain.
///
/// Duplicates are retained on purpose: raw volume drives the heat metric,
/// not distinct speakers. Shared between the message handler and the
/// throttle loop, so the map sits behind a mutex.
#[derive(Debug, Default)]
pub struct ActivityCounter {
    channels: Mutex<HashMap<String, Vec<String>>>,
}

impl ActivityCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one message event. O(1) append.
    pub fn record(&self, channel_id: &str, user_id: &str) {
        let mut channels = self
            .channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        channels
            .entry(channel_id.to_string())
            .or_default()
            .push(user_id.to_string());
    }

    /// Atomically take the per-channel message counts and clear everything
    /// for the next cycle. Channels with no activity are simply absent.
    pub fn drain_and_reset(&self) -> HashMap<String, usize> {
        let mut channels = self
            .channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        channels
            .drain()
            .map(|(channel, spoken)| (channel, spoken.len()))
            .collect()
    }
}
