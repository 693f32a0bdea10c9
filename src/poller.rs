//! Polling tick source with explicit reset semantics
//!
//! A reset cancels the pending tick and schedules a fresh interval, so a
//! user interaction that already refreshed out-of-band is not followed by a
//! redundant scheduled tick moments later. There is no overlap guard here:
//! the engine owns cycle serialization.

use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

/// Repeating tick source for the refresh loop
pub struct PollingScheduler {
    period: Duration,
    timer: Interval,
}

impl PollingScheduler {
    /// Create a scheduler whose first tick fires one full period from now
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            timer: make_timer(period),
        }
    }

    /// Wait for the next tick
    pub async fn tick(&mut self) {
        self.timer.tick().await;
    }

    /// Cancel the pending tick and start a fresh interval
    pub fn reset(&mut self) {
        self.timer = make_timer(self.period);
    }

    /// The configured period
    pub fn period(&self) -> Duration {
        self.period
    }
}

fn make_timer(period: Duration) -> Interval {
    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}
