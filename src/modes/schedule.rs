//! Fixed-period tick schedule
//!
//! The engine never waits on time itself. A host owns one `TickSchedule`,
//! starts it when a game starts and stops it when the game ends. Starting it
//! again replaces the old interval, so two schedules can never both be live.

use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

pub struct TickSchedule {
    period: Duration,
    interval: Option<Interval>,
}

impl TickSchedule {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            interval: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_active(&self) -> bool {
        self.interval.is_some()
    }

    /// Install a fresh schedule; the first tick fires one period from now.
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        let mut interval = interval_at(Instant::now() + self.period, self.period);
        // A stalled loop must not replay a burst of ticks afterwards
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
    }

    pub fn stop(&mut self) {
        self.interval = None;
    }

    /// Wait for the next tick; pends forever while stopped
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}
