//! Administrator command surface for the broadcast queue.
//!
//! Each function returns the reply text to show the administrator.
//! Authorization is the caller's job — these assume the command already
//! passed whatever admin gate the platform layer applies.

use chrono::Utc;

use hearthbot_core::config::AnnounceConfig;
use hearthbot_core::error::HearthError;

use crate::queue::{AddOutcome, BroadcastQueue};
use crate::scheduler::{delay_until_next_fire, AnnouncementScheduler};

/// When the next announcement fires, e.g. "09:00 UTC (22h58m left)".
pub fn next_announcement_info(config: &AnnounceConfig) -> String {
    let remaining = delay_until_next_fire(Utc::now(), config);
    let hours = remaining.num_hours();
    let minutes = remaining.num_minutes() % 60;
    format!(
        "{:02}:{:02} UTC ({hours}h{minutes}m left)",
        config.hour, config.minute
    )
}

/// Queue an announcement item.
pub fn add_item(queue: &BroadcastQueue, config: &AnnounceConfig, text: &str) -> String {
    match queue.add(text) {
        Ok(AddOutcome::Added { pending }) => format!(
            "Added! {pending} item(s) will be announced at {}.",
            next_announcement_info(config)
        ),
        Ok(AddOutcome::Duplicate { pending }) => format!(
            "That item (and {} other(s)) is already going to be announced at {}.",
            pending - 1,
            next_announcement_info(config)
        ),
        Err(HearthError::EmptyBroadcast) => "Can't add announcement: no text provided.".into(),
        Err(e) => format!("Couldn't add announcement: {e}"),
    }
}

/// Show everything currently queued.
pub fn list_items(queue: &BroadcastQueue, config: &AnnounceConfig) -> String {
    let items = match queue.list() {
        Ok(items) => items,
        Err(e) => return format!("Couldn't read the queue: {e}"),
    };
    let info = next_announcement_info(config);

    if items.is_empty() {
        format!("There is nothing queued, so the next announcement at {info} will be skipped.")
    } else {
        format!(
            "The following will be announced at {info}:\n{}",
            items.join("\n")
        )
    }
}

/// Empty the queue.
pub fn clear_items(queue: &BroadcastQueue) -> String {
    match queue.clear() {
        Ok(()) => "Announcements cleared!".into(),
        Err(e) => format!("Couldn't clear the queue: {e}"),
    }
}

/// Flush the queue immediately; the daily cadence is unaffected.
pub async fn post_now(scheduler: &AnnouncementScheduler) -> String {
    match scheduler.post_now().await {
        Ok(true) => "Announcements posted.".into(),
        Ok(false) => "Nothing to announce.".into(),
        Err(e) => format!("Failed to post announcements: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn queue() -> BroadcastQueue {
        BroadcastQueue::new(Arc::new(MemoryStore::new()))
    }

    fn config() -> AnnounceConfig {
        AnnounceConfig { hour: 9, minute: 0 }
    }

    #[test]
    fn test_add_reports_queue_length_and_fire_time() {
        let queue = queue();
        let reply = add_item(&queue, &config(), "Free weekend for everyone");
        assert!(reply.starts_with("Added! 1 item(s)"));
        assert!(reply.contains("09:00 UTC"));
    }

    #[test]
    fn test_duplicate_add_is_distinguishable() {
        let queue = queue();
        let first = add_item(&queue, &config(), "same");
        let second = add_item(&queue, &config(), "same");
        assert!(first.starts_with("Added!"));
        assert!(second.starts_with("That item"));
        assert_eq!(queue.list().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_add_is_rejected_with_message() {
        let queue = queue();
        assert_eq!(
            add_item(&queue, &config(), "   "),
            "Can't add announcement: no text provided."
        );
        assert!(queue.list().unwrap().is_empty());
    }

    #[test]
    fn test_list_mentions_skip_when_empty() {
        let queue = queue();
        assert!(list_items(&queue, &config()).contains("will be skipped"));
        queue.add("an item").unwrap();
        assert!(list_items(&queue, &config()).contains("an item"));
    }

    #[test]
    fn test_clear() {
        let queue = queue();
        queue.add("an item").unwrap();
        assert_eq!(clear_items(&queue), "Announcements cleared!");
        assert!(queue.list().unwrap().is_empty());
    }
}
