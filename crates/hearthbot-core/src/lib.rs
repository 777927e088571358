//! # Hearthbot Core
//! Shared foundation for the hearthbot workspace: the error type, the TOML
//! configuration, and the traits the chat platform adapter must implement.

pub mod config;
pub mod error;
pub mod traits;

pub use config::{AnnounceConfig, HearthConfig, ThrottleConfig};
pub use error::{HearthError, Result};
pub use traits::{ChannelControl, Messenger};
