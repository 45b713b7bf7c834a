//! Shared utilities for cvm-session
//!
//! This crate provides:
//! - The error taxonomy shared by every layer (`CvmError`)
//! - Countdown and time-of-day helpers
//! - Visit identifiers for log correlation
//! - Default paths for config and data
//! - URL helpers

mod error;
mod ids;
mod paths;
mod time;
mod urls;

pub use error::*;
pub use ids::*;
pub use paths::*;
pub use time::*;
pub use urls::*;
