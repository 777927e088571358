//! The daily announcement loop.
//!
//! Sleeps until the next configured UTC fire time, flushes the queue
//! through the message sink, and goes back to sleep. A manual
//! [`AnnouncementScheduler::post_now`] performs the same flush without
//! disturbing the scheduled wake time.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, NaiveTime, Utc};
use rand::seq::SliceRandom;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use hearthbot_core::config::AnnounceConfig;
use hearthbot_core::error::Result;
use hearthbot_core::traits::Messenger;

use crate::queue::BroadcastQueue;

/// Fixed pool of opening lines; one is picked at random per announcement.
const ANNOUNCE_LINES: [&str; 3] = [
    "Gather round, I've been saving these up all day:",
    "Fresh from the notice board! Today's announcements:",
    "Here's what the community should know today:",
];

/// Time until the next daily fire.
///
/// Always in `(0h, 24h]`: if today's fire time has already passed — or is
/// exactly now, which counts as passed so the same instant never fires
/// twice — the next fire is tomorrow.
pub fn delay_until_next_fire(now: DateTime<Utc>, config: &AnnounceConfig) -> Duration {
    let target = NaiveTime::from_hms_opt(config.hour, config.minute, 0)
        .unwrap_or(NaiveTime::MIN);
    let mut candidate = now.date_naive().and_time(target).and_utc();
    if candidate <= now {
        candidate += Duration::days(1);
    }
    candidate - now
}

/// Daily announcement scheduler for one announcement channel.
pub struct AnnouncementScheduler {
    queue: Arc<BroadcastQueue>,
    messenger: Arc<dyn Messenger>,
    config: AnnounceConfig,
    task: Mutex<Option<JoinHandle<()>>>,
    shutdown: watch::Sender<bool>,
}

impl AnnouncementScheduler {
    pub fn new(
        queue: Arc<BroadcastQueue>,
        messenger: Arc<dyn Messenger>,
        config: AnnounceConfig,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            queue,
            messenger,
            config,
            task: Mutex::new(None),
            shutdown,
        }
    }

    /// Start the daily loop.
    ///
    /// Idempotent: returns `true` if a loop was started, `false` if one is
    /// already running. Check-and-spawn happens under one lock.
    pub fn start(&self) -> bool {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.is_some() {
            tracing::debug!("Announcement loop already running, ignoring start");
            return false;
        }

        tracing::info!(
            "Announcement loop started: firing daily at {:02}:{:02} UTC",
            self.config.hour,
            self.config.minute
        );

        let queue = Arc::clone(&self.queue);
        let messenger = Arc::clone(&self.messenger);
        let config = self.config.clone();
        let mut shutdown = self.shutdown.subscribe();

        *task = Some(tokio::spawn(async move {
            loop {
                let delay = delay_until_next_fire(Utc::now(), &config);
                let sleep = delay.to_std().unwrap_or_default();
                tokio::select! {
                    _ = tokio::time::sleep(sleep) => {}
                    _ = shutdown.changed() => {
                        tracing::info!("Announcement loop stopped");
                        return;
                    }
                }
                if let Err(e) = flush(&queue, messenger.as_ref()).await {
                    // Items stay queued; the next fire retries them.
                    tracing::warn!("Scheduled announcement failed: {e}");
                }
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

    /// Flush the queue right now, leaving the scheduled wake time of the
    /// running loop untouched. Returns whether anything was sent.
    pub async fn post_now(&self) -> Result<bool> {
        flush(&self.queue, self.messenger.as_ref()).await
    }
}

/// Send every pending item as one message and clear the queue.
///
/// An empty queue is a no-op. The queue is cleared only after the sink
/// accepts the message, so a failed send keeps the items for the next fire.
async fn flush(queue: &BroadcastQueue, messenger: &dyn Messenger) -> Result<bool> {
    let items = queue.list()?;
    if items.is_empty() {
        return Ok(false);
    }

    let flavor = ANNOUNCE_LINES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(ANNOUNCE_LINES[0]);
    let message = format!("{flavor}\n\n{}", items.join("\n"));

    messenger.send_message(&message).await?;
    queue.clear()?;
    tracing::info!("Announced {} item(s)", items.len());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use hearthbot_core::error::HearthError;

    fn nine_am() -> AnnounceConfig {
        AnnounceConfig { hour: 9, minute: 0 }
    }

    #[test]
    fn test_fire_later_today() {
        let now = Utc.with_ymd_and_hms(2026, 2, 22, 8, 0, 0).unwrap();
        assert_eq!(delay_until_next_fire(now, &nine_am()), Duration::hours(1));
    }

    #[test]
    fn test_fire_rolls_to_tomorrow() {
        let now = Utc.with_ymd_and_hms(2026, 2, 22, 10, 0, 0).unwrap();
        assert_eq!(delay_until_next_fire(now, &nine_am()), Duration::hours(23));
    }

    #[test]
    fn test_exact_match_waits_a_full_day() {
        let now = Utc.with_ymd_and_hms(2026, 2, 22, 9, 0, 0).unwrap();
        assert_eq!(delay_until_next_fire(now, &nine_am()), Duration::hours(24));
    }

    #[test]
    fn test_delay_is_always_positive_and_at_most_a_day() {
        let config = AnnounceConfig {
            hour: 17,
            minute: 30,
        };
        for hour in 0..24 {
            for minute in (0..60).step_by(7) {
                let now = Utc.with_ymd_and_hms(2026, 2, 22, hour, minute, 13).unwrap();
                let delay = delay_until_next_fire(now, &config);
                assert!(delay > Duration::zero(), "now={now}");
                assert!(delay <= Duration::hours(24), "now={now}");
            }
        }
    }

    /// Messenger that records sent messages and can be told to fail.
    #[derive(Default)]
    struct RecordingMessenger {
        sent: Mutex<Vec<String>>,
        failing: bool,
    }

    impl RecordingMessenger {
        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Messenger for RecordingMessenger {
        async fn send_message(&self, text: &str) -> Result<()> {
            if self.failing {
                return Err(HearthError::Channel("simulated outage".into()));
            }
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn queue() -> Arc<BroadcastQueue> {
        Arc::new(BroadcastQueue::new(Arc::new(MemoryStore::new())))
    }

    #[tokio::test]
    async fn test_flush_empty_queue_sends_nothing() {
        let queue = queue();
        let messenger = RecordingMessenger::default();
        assert!(!flush(&queue, &messenger).await.unwrap());
        assert!(messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn test_flush_sends_items_one_per_line_and_clears() {
        let queue = queue();
        queue.add("Game one is free").unwrap();
        queue.add("Game two is free").unwrap();
        let messenger = RecordingMessenger::default();

        assert!(flush(&queue, &messenger).await.unwrap());

        let sent = messenger.sent();
        assert_eq!(sent.len(), 1);
        let (flavor, body) = sent[0].split_once("\n\n").unwrap();
        assert!(ANNOUNCE_LINES.contains(&flavor));
        assert_eq!(body, "Game one is free\nGame two is free");
        assert!(queue.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_send_keeps_the_queue() {
        let queue = queue();
        queue.add("important notice").unwrap();
        let messenger = RecordingMessenger {
            failing: true,
            ..Default::default()
        };

        assert!(flush(&queue, &messenger).await.is_err());
        assert_eq!(queue.list().unwrap(), vec!["important notice"]);
    }

    #[tokio::test]
    async fn test_post_now_flushes_immediately() {
        let queue = queue();
        queue.add("surprise drop").unwrap();
        let messenger = Arc::new(RecordingMessenger::default());
        let scheduler =
            AnnouncementScheduler::new(Arc::clone(&queue), messenger.clone(), nine_am());

        assert!(scheduler.post_now().await.unwrap());
        assert!(!scheduler.post_now().await.unwrap()); // queue now empty
        assert_eq!(messenger.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let scheduler = AnnouncementScheduler::new(
            queue(),
            Arc::new(RecordingMessenger::default()),
            nine_am(),
        );
        assert!(scheduler.start());
        assert!(!scheduler.start());
        scheduler.stop().await;
        assert!(scheduler.start());
        scheduler.stop().await;
    }
}
