//! Tick sources for the usage timer

use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Periodic source of timer ticks
#[async_trait]
pub trait TickSource: Send {
    /// Wait for the next tick and return the whole seconds elapsed since the
    /// previous one. May return 0 or more than 1 when the clock is imprecise.
    async fn next_tick(&mut self) -> u64;
}

/// Wall-clock ticks once per second, measured on the monotonic clock
pub struct IntervalTicks {
    interval: Interval,
    last: Instant,
    carry: Duration,
}

impl IntervalTicks {
    pub fn every_second() -> Self {
        Self::with_period(Duration::from_secs(1))
    }

    pub fn with_period(period: Duration) -> Self {
        let now = Instant::now();
        let mut interval = tokio::time::interval_at(now + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            interval,
            last: now,
            carry: Duration::ZERO,
        }
    }
}

#[async_trait]
impl TickSource for IntervalTicks {
    async fn next_tick(&mut self) -> u64 {
        self.interval.tick().await;
        let now = Instant::now();
        let elapsed = now.duration_since(self.last) + self.carry;
        self.last = now;

        let secs = elapsed.as_secs();
        self.carry = elapsed - Duration::from_secs(secs);
        secs
    }
}

/// Deterministic ticks for tests: scripted steps, then one second per call
#[derive(Debug, Default)]
pub struct ManualTicks {
    steps: VecDeque<u64>,
    delivered: u64,
}

impl ManualTicks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver these step sizes first
    pub fn from_steps(steps: impl IntoIterator<Item = u64>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            delivered: 0,
        }
    }

    /// Number of ticks handed out so far
    pub fn delivered(&self) -> u64 {
        self.delivered
    }
}

#[async_trait]
impl TickSource for ManualTicks {
    async fn next_tick(&mut self) -> u64 {
        self.delivered += 1;
        self.steps.pop_front().unwrap_or(1)
    }
}
