//! Hearthbot error type.

use thiserror::Error;

/// Errors surfaced by the hearthbot crates.
#[derive(Debug, Error)]
pub enum HearthError {
    /// Configuration could not be read, parsed, or validated.
    #[error("config error: {0}")]
    Config(String),

    /// The durable broadcast-item store failed.
    #[error("store error: {0}")]
    Store(String),

    /// A chat-platform sink call failed (slowmode update or message send).
    #[error("channel error: {0}")]
    Channel(String),

    /// A broadcast add was attempted with empty or whitespace-only text.
    #[error("broadcast item is empty")]
    EmptyBroadcast,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HearthError>;
