//! Time helpers for cvm-session
//!
//! Countdown formatting for the usage timer and the wall-clock part of day
//! used by the premium greeting.

use chrono::{DateTime, Local, Timelike};

/// Get the current local time.
pub fn now() -> DateTime<Local> {
    Local::now()
}

/// Format a countdown as zero-padded `MM:SS`.
///
/// Minutes are not wrapped into hours, so 3600 renders as `60:00`.
pub fn format_countdown(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Coarse part of the day, as used in greetings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartOfDay {
    Morning,
    Afternoon,
    Evening,
}

impl PartOfDay {
    /// Before noon is morning, before 18:00 afternoon, otherwise evening.
    pub fn from_hour(hour: u32) -> Self {
        if hour < 12 {
            Self::Morning
        } else if hour < 18 {
            Self::Afternoon
        } else {
            Self::Evening
        }
    }

    pub fn of(dt: &DateTime<Local>) -> Self {
        Self::from_hour(dt.hour())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
        }
    }
}
