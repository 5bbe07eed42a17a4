//! Ports between the timer engine and the platform.
//!
//! The engine never sleeps or reads the wall clock directly. A
//! [`TickDriver`] owns the recurring one-second callback and a [`Clock`]
//! supplies timestamps, so tests can drive sessions synchronously.

use chrono::{DateTime, Utc};

/// Recurring one-tick-per-second scheduler
///
/// The engine arms the driver on `start`, and disarms it on `reset`,
/// completion and discard. Whoever owns the platform timer calls
/// `TimerEngine::tick` once per fired tick while the driver is armed;
/// ticks must never overlap and a late tick still counts as one second.
pub trait TickDriver {
    fn arm(&mut self);
    fn disarm(&mut self);
    fn is_armed(&self) -> bool;
}

/// Driver with no platform timer behind it
///
/// Ticks are delivered by calling `tick` directly (tests, simulations).
#[derive(Debug, Default)]
pub struct ManualDriver {
    armed: bool,
    arm_count: u32,
}

impl ManualDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times the driver has been armed since creation
    pub fn arm_count(&self) -> u32 {
        self.arm_count
    }
}

impl TickDriver for ManualDriver {
    fn arm(&mut self) {
        self.armed = true;
        self.arm_count += 1;
    }

    fn disarm(&mut self) {
        self.armed = false;
    }

    fn is_armed(&self) -> bool {
        self.armed
    }
}

/// Source of timestamps for start and end times
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a single instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
