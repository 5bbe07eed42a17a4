//! One-second tick driver backed by a tokio interval.

use runstory_core::TickDriver;
use tokio::time::{interval_at, Duration, Instant, Interval, MissedTickBehavior};

pub struct IntervalDriver {
    period: Duration,
    interval: Option<Interval>,
}

impl IntervalDriver {
    pub fn new() -> Self {
        Self {
            period: Duration::from_secs(1),
            interval: None,
        }
    }

    /// Wait for the next tick; never resolves while disarmed
    pub async fn next_tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

impl TickDriver for IntervalDriver {
    fn arm(&mut self) {
        if self.interval.is_none() {
            let mut interval = interval_at(Instant::now() + self.period, self.period);
            // A late tick is still one second of schedule time; no catch-up bursts
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            self.interval = Some(interval);
        }
    }

    fn disarm(&mut self) {
        self.interval = None;
    }

    fn is_armed(&self) -> bool {
        self.interval.is_some()
    }
}
