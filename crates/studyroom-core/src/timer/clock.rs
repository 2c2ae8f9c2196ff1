//! One-second tick driver.
//!
//! The driver is armed only while the timer runs. Arming twice keeps the
//! existing interval, so there is never more than one periodic source
//! feeding `tick()`.

use std::future;
use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::debug;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct ClockTick {
    period: Duration,
    interval: Option<Interval>,
}

impl ClockTick {
    pub fn new() -> Self {
        Self::with_period(TICK_PERIOD)
    }

    pub fn with_period(period: Duration) -> Self {
        Self {
            period,
            interval: None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    /// Arm on `running`, disarm otherwise. Must be called whenever the
    /// machine's running flag may have changed.
    pub fn sync(&mut self, running: bool) {
        match (running, self.interval.is_some()) {
            (true, false) => {
                // First tick lands one full period after arming.
                let mut interval = interval_at(Instant::now() + self.period, self.period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                self.interval = Some(interval);
                debug!("clock armed");
            }
            (false, true) => {
                self.interval = None;
                debug!("clock disarmed");
            }
            _ => {}
        }
    }

    /// Wait for the next tick. Never resolves while disarmed, which makes it
    /// safe to use as a `tokio::select!` branch.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => future::pending::<()>().await,
        }
    }
}

impl Default for ClockTick {
    fn default() -> Self {
        Self::new()
    }
}
