//! The slowmode adjustment loop.
//!
//! Every `cycle_secs` the controller drains the [`ActivityCounter`], computes
//! a desired slowmode per channel from the quadratic heat metric, and writes
//! the new value through the [`ChannelControl`] sink — but only when it
//! actually changed. Per-cycle movement is capped by `increase_max` /
//! `decrease_max` so one burst cannot slam a channel shut and one quiet
//! cycle cannot fling it open.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use hearthbot_core::config::ThrottleConfig;
use hearthbot_core::traits::ChannelControl;

use crate::activity::ActivityCounter;

/// Compute the next slowmode value for one channel.
///
/// `count` is the number of messages seen this cycle, `old` the currently
/// enforced delay. The result is always within `[0, max_slowmode]` and
/// within `[old - decrease_max, old + increase_max]`.
pub fn next_slowmode(count: usize, old: u32, config: &ThrottleConfig) -> u32 {
    let count = count as u64;
    let heat = count.saturating_mul(count);
    let desired = (heat / config.threshold).min(u64::from(config.max_slowmode)) as u32;

    let new = desired.min(old.saturating_add(config.increase_max));
    new.max(old.saturating_sub(config.decrease_max))
}

/// Periodic slowmode controller for one server.
///
/// The channel list is snapshotted at `start`; channels created afterwards
/// are not managed until the next restart.
pub struct ThrottleController {
    activity: Arc<ActivityCounter>,
    control: Arc<dyn ChannelControl>,
    config: ThrottleConfig,
    task: Mutex<Option<JoinHandle<()>>>,
    shutdown: watch::Sender<bool>,
}

impl ThrottleController {
    pub fn new(
        activity: Arc<ActivityCounter>,
        control: Arc<dyn ChannelControl>,
        config: ThrottleConfig,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            activity,
            control,
            config,
            task: Mutex::new(None),
            shutdown,
        }
    }

    /// Start the adjustment loop over the given channels.
    ///
    /// Idempotent: returns `true` if a loop was started, `false` if one is
    /// already running. The check-and-spawn happens under one lock so two
    /// concurrent calls cannot both start a loop.
    pub fn start(&self, channels: Vec<String>) -> bool {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.is_some() {
            tracing::debug!("Throttle loop already running, ignoring start");
            return false;
        }

        tracing::info!(
            "Throttle loop started: {} channels, cycle {}s",
            channels.len(),
            self.config.cycle_secs
        );

        let activity = Arc::clone(&self.activity);
        let control = Arc::clone(&self.control);
        let config = self.config.clone();
        let protected: HashSet<String> = config.protected_channels.iter().cloned().collect();
        let mut shutdown = self.shutdown.subscribe();

        *task = Some(tokio::spawn(async move {
            let wait = Duration::from_secs(config.cycle_secs);
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(wait) => {}
                    _ = shutdown.changed() => {
                        tracing::info!("Throttle loop stopped");
                        return;
                    }
                }
                run_cycle(&channels, &activity, control.as_ref(), &config, &protected).await;
            }
        }));
        true
    }

    /// Signal the loop to stop and wait for it to finish.
    pub async fn stop(&self) {
        let task = {
            let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
            task.take()
        };
        if let Some(task) = task {
            let _ = self.shutdown.send(true);
            let _ = task.await;
        }
    }
}

/// One adjustment pass over every managed channel.
///
/// A sink failure on one channel is logged and must not stop the rest of
/// the cycle; channels are independent.
async fn run_cycle(
    channels: &[String],
    activity: &ActivityCounter,
    control: &dyn ChannelControl,
    config: &ThrottleConfig,
    protected: &HashSet<String>,
) {
    let counts = activity.drain_and_reset();

    for channel in channels {
        if protected.contains(channel) {
            continue;
        }

        let count = counts.get(channel).copied().unwrap_or(0);

        let old = match control.slowmode_delay(channel).await {
            Ok(delay) => delay,
            Err(e) => {
                tracing::warn!("Failed to read slowmode for {channel}: {e}");
                continue;
            }
        };

        let new = next_slowmode(count, old, config);
        if new == old {
            continue;
        }

        match control.set_slowmode_delay(channel, new).await {
            Ok(()) => {
                tracing::info!("Slowmode for {channel}: {old}s -> {new}s ({count} messages)")
            }
            Err(e) => tracing::warn!("Failed to set slowmode for {channel}: {e}"),
        }
    }
}
