//! # Hearthbot Throttle
//! Adaptive per-channel slowmode.
//!
//! Message events feed the [`ActivityCounter`]; every cycle the
//! [`ThrottleController`] drains it, weighs each channel's volume
//! quadratically, and nudges that channel's slowmode toward the desired
//! level — bounded per cycle so the limit never whipsaws.

pub mod activity;
pub mod controller;

pub use activity::ActivityCounter;
pub use controller::{next_slowmode, ThrottleController};
