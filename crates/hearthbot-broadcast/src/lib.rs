//! # Hearthbot Broadcast
//! Scheduled daily announcements.
//!
//! Administrators queue items into the deduplicated, insertion-ordered
//! [`BroadcastQueue`]; once a day at the configured UTC time the
//! [`AnnouncementScheduler`] flushes everything pending through the
//! platform's message sink. Items survive restarts via the SQLite-backed
//! [`SqliteStore`].

pub mod commands;
pub mod queue;
pub mod scheduler;
pub mod store;

pub use queue::{AddOutcome, BroadcastQueue};
pub use scheduler::{delay_until_next_fire, AnnouncementScheduler};
pub use store::{ItemStore, MemoryStore, SqliteStore};
