//! Foundation module - Core utilities shared by the Anchor layers
//!
//! - Logging setup
//! - Event clock and frame timing

pub mod logging;
pub mod time;
