//! Hearthbot configuration system.
//!
//! All tuning knobs are loaded once at process start and passed into the
//! controllers by value; nothing reads configuration globally afterwards.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{HearthError, Result};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HearthConfig {
    #[serde(default)]
    pub throttle: ThrottleConfig,
    #[serde(default)]
    pub announce: AnnounceConfig,
}

impl HearthConfig {
    /// Load config from the default path (~/.hearthbot/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| HearthError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| HearthError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| HearthError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".hearthbot")
            .join("config.toml")
    }

    /// Get the hearthbot home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".hearthbot")
    }

    /// Reject values the controllers cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.throttle.threshold == 0 {
            return Err(HearthError::Config(
                "throttle.threshold must be greater than zero".into(),
            ));
        }
        if self.throttle.cycle_secs == 0 {
            return Err(HearthError::Config(
                "throttle.cycle_secs must be greater than zero".into(),
            ));
        }
        if self.announce.hour > 23 {
            return Err(HearthError::Config(format!(
                "announce.hour must be 0-23, got {}",
                self.announce.hour
            )));
        }
        if self.announce.minute > 59 {
            return Err(HearthError::Config(format!(
                "announce.minute must be 0-59, got {}",
                self.announce.minute
            )));
        }
        Ok(())
    }
}

/// Adaptive slowmode configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// How long to sleep between adjustment cycles, in seconds.
    #[serde(default = "default_cycle_secs")]
    pub cycle_secs: u64,
    /// Upper bound for any slowmode value, in seconds.
    #[serde(default = "default_max_slowmode")]
    pub max_slowmode: u32,
    /// Divisor between slowmode levels, arbitrary units.
    #[serde(default = "default_threshold")]
    pub threshold: u64,
    /// The most slowmode may increase in one cycle, in seconds.
    #[serde(default = "default_increase_max")]
    pub increase_max: u32,
    /// The most slowmode may decrease in one cycle, in seconds.
    #[serde(default = "default_decrease_max")]
    pub decrease_max: u32,
    /// Channels excluded from all automatic adjustment.
    #[serde(default)]
    pub protected_channels: Vec<String>,
}

fn default_cycle_secs() -> u64 {
    120
}
fn default_max_slowmode() -> u32 {
    15
}
fn default_threshold() -> u64 {
    100
}
fn default_increase_max() -> u32 {
    4
}
fn default_decrease_max() -> u32 {
    2
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            cycle_secs: default_cycle_secs(),
            max_slowmode: default_max_slowmode(),
            threshold: default_threshold(),
            increase_max: default_increase_max(),
            decrease_max: default_decrease_max(),
            protected_channels: Vec::new(),
        }
    }
}

/// Daily announcement configuration. The fire time is UTC wall-clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnounceConfig {
    #[serde(default = "default_announce_hour")]
    pub hour: u32,
    #[serde(default)]
    pub minute: u32,
}

fn default_announce_hour() -> u32 {
    9
}

impl Default for AnnounceConfig {
    fn default() -> Self {
        Self {
            hour: default_announce_hour(),
            minute: 0,
        }
    }
}
