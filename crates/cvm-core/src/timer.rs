//! Usage timer
//!
//! Counts a quota down one second per tick, fires a single low-time warning
//! and a single terminal expiry. Nothing is emitted after expiry.

use cvm_api::Entitlement;
use cvm_config::TimerSettings;
use cvm_util::format_countdown;

/// Countdown state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerState {
    pub remaining_seconds: u64,
    pub warning_fired: bool,
    pub expired: bool,
}

/// Events produced by advancing the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Remaining time changed
    Tick { remaining_seconds: u64 },
    /// Low-time threshold reached (once per session)
    LowTime { remaining_seconds: u64 },
    /// Quota exhausted (once; terminal)
    Expired,
}

/// Quota for the given entitlement
pub fn quota_for(entitlement: Entitlement, settings: &TimerSettings) -> u64 {
    match entitlement {
        Entitlement::Premium => settings.premium_quota_seconds,
        Entitlement::Free => settings.free_quota_seconds,
    }
}

#[derive(Debug, Clone)]
pub struct UsageTimer {
    state: TimerState,
    warning_threshold: u64,
    running: bool,
}

impl UsageTimer {
    /// Start counting down `quota_seconds`, warning at `warning_threshold`
    pub fn start(quota_seconds: u64, warning_threshold: u64) -> Self {
        Self {
            state: TimerState {
                remaining_seconds: quota_seconds,
                warning_fired: false,
                expired: false,
            },
            warning_threshold,
            running: true,
        }
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Remaining time as `MM:SS`
    pub fn display(&self) -> String {
        format_countdown(self.state.remaining_seconds)
    }

    /// Advance by one second
    pub fn tick(&mut self) -> Vec<TimerEvent> {
        self.advance(1)
    }

    /// Advance by `seconds` (a late tick source may report more than one)
    pub fn advance(&mut self, seconds: u64) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        if !self.running || seconds == 0 {
            return events;
        }

        let remaining = self.state.remaining_seconds.saturating_sub(seconds);
        self.state.remaining_seconds = remaining;
        events.push(TimerEvent::Tick {
            remaining_seconds: remaining,
        });

        if remaining == 0 {
            self.state.expired = true;
            self.running = false;
            events.push(TimerEvent::Expired);
            return events;
        }

        // Fires on the first tick at or under the threshold, so a skipped
        // second cannot swallow the warning.
        if !self.state.warning_fired && remaining <= self.warning_threshold {
            self.state.warning_fired = true;
            events.push(TimerEvent::LowTime {
                remaining_seconds: remaining,
            });
        }

        events
    }

    /// Stop without expiring
    pub fn cancel(&mut self) {
        self.running = false;
    }
}
