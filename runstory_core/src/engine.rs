//! Countdown engine for interval sessions.
//!
//! The engine owns the only writable copy of the timer state and advances
//! it through the set → interval → pause → rest hierarchy:
//! - Active: counting down an interval
//! - Pause: counting down the finished interval's pause
//! - Rest: counting down the finished set's rest (next interval already staged)
//! - Complete: terminal
//!
//! Every change replaces the published [`TimerState`] snapshot and is
//! delivered to subscribers in order. With no schedule loaded every control
//! call is a silent no-op.

use crate::driver::{Clock, SystemClock, TickDriver};
use crate::{progress, Position, Schedule, TimerState};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Handle returned by [`TimerEngine::subscribe`]
pub type SubscriptionId = u64;

type Observer = Box<dyn FnMut(&TimerState)>;

struct LoadedSession {
    schedule: Schedule,
    state: Arc<TimerState>,
}

/// Hierarchical countdown state machine
pub struct TimerEngine<D: TickDriver> {
    session: Option<LoadedSession>,
    driver: D,
    clock: Box<dyn Clock>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: SubscriptionId,
}

impl<D: TickDriver> TimerEngine<D> {
    /// Create an engine with no session loaded
    pub fn new(driver: D) -> Self {
        Self {
            session: None,
            driver,
            clock: Box::new(SystemClock),
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Create an engine with `schedule` loaded in its initial state
    pub fn with_schedule(schedule: Schedule, driver: D) -> Self {
        let mut engine = Self::new(driver);
        engine.load(schedule);
        engine
    }

    /// Replace the timestamp source
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.set_clock(clock);
        self
    }

    pub fn set_clock(&mut self, clock: impl Clock + 'static) {
        self.clock = Box::new(clock);
    }

    // ------------------------------------------------------------------------
    // Session lifecycle
    // ------------------------------------------------------------------------

    /// Load a schedule as a fresh session, replacing any current one
    pub fn load(&mut self, schedule: Schedule) {
        self.driver.disarm();

        let session_id = Uuid::new_v4();
        let initial = TimerState::initial(&schedule, session_id);
        tracing::info!(
            "Loaded session {} ({} sets, {} seconds)",
            session_id,
            schedule.set_count(),
            schedule.total_seconds()
        );

        self.session = Some(LoadedSession {
            schedule,
            state: Arc::new(initial),
        });
        self.publish();
    }

    /// Tear the session down entirely; the engine returns to its empty state
    pub fn discard(&mut self) {
        self.driver.disarm();
        if let Some(session) = self.session.take() {
            tracing::info!("Discarded session {}", session.state.session_id);
        }
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    pub fn schedule(&self) -> Option<&Schedule> {
        self.session.as_ref().map(|s| &s.schedule)
    }

    /// Latest published state
    pub fn state(&self) -> Option<&TimerState> {
        self.session.as_ref().map(|s| s.state.as_ref())
    }

    /// Shared handle to the latest published state
    pub fn snapshot(&self) -> Option<Arc<TimerState>> {
        self.session.as_ref().map(|s| Arc::clone(&s.state))
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    // ------------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------------

    /// Register an observer called with every new snapshot, in order
    pub fn subscribe(&mut self, observer: impl FnMut(&TimerState) + 'static) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer; returns false if it was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    fn publish(&mut self) {
        if let Some(session) = &self.session {
            for (_, observer) in self.observers.iter_mut() {
                observer(&session.state);
            }
        }
    }

    /// Swap in a new snapshot; returns whether anything changed
    fn replace(&mut self, next: TimerState) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if *session.state == next {
            return false;
        }
        session.state = Arc::new(next);
        self.publish();
        true
    }

    // ------------------------------------------------------------------------
    // Controls
    // ------------------------------------------------------------------------

    /// Start counting; no-op if already running or complete
    ///
    /// The start timestamp is recorded on the first call only.
    pub fn start(&mut self) -> bool {
        let Some(current) = self.state() else {
            return false;
        };
        if current.running || current.is_complete() {
            return false;
        }

        let mut next = current.clone();
        next.running = true;
        next.paused = false;
        if next.start_time.is_none() {
            next.start_time = Some(self.clock.now());
        }

        tracing::info!("Session {} started", next.session_id);
        self.driver.arm();
        self.replace(next)
    }

    /// Freeze the countdown; ticks become no-ops until `resume`
    pub fn pause(&mut self) -> bool {
        let Some(current) = self.state() else {
            return false;
        };
        if !current.running || current.paused {
            return false;
        }

        let mut next = current.clone();
        next.paused = true;
        tracing::info!("Session {} paused", next.session_id);
        self.replace(next)
    }

    /// Continue exactly where `pause` left off
    pub fn resume(&mut self) -> bool {
        let Some(current) = self.state() else {
            return false;
        };
        if !current.running || !current.paused {
            return false;
        }

        let mut next = current.clone();
        next.paused = false;
        tracing::info!("Session {} resumed", next.session_id);
        self.replace(next)
    }

    /// Stop the driver and return to the initial state for the schedule
    pub fn reset(&mut self) -> bool {
        self.driver.disarm();

        let Some(session) = self.session.as_ref() else {
            return false;
        };
        let initial = TimerState::initial(&session.schedule, session.state.session_id);
        tracing::info!("Session {} reset", initial.session_id);
        self.replace(initial)
    }

    /// Consume one second of schedule time
    ///
    /// No-op unless running and not paused. Returns whether the state changed.
    pub fn tick(&mut self) -> bool {
        let Some(session) = self.session.as_ref() else {
            return false;
        };
        if !session.state.is_ticking() {
            return false;
        }

        let next = step(&session.state, &session.schedule, self.clock.now());
        if next.is_complete() {
            tracing::info!("Session {} complete", next.session_id);
            self.driver.disarm();
        }
        self.replace(next)
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn format_remaining(&self) -> Option<String> {
        self.state().map(progress::format_remaining)
    }

    pub fn phase_progress(&self) -> Option<f64> {
        let session = self.session.as_ref()?;
        Some(progress::current_phase_progress(
            &session.state,
            &session.schedule,
        ))
    }

    pub fn session_progress(&self) -> Option<f64> {
        let session = self.session.as_ref()?;
        Some(progress::session_progress(&session.state, &session.schedule))
    }
}

/// Apply one second to whichever counter is active, then the transition rules
///
/// Exactly one counter is decremented. Zero-length pauses and rests are
/// never entered.
pub fn step(state: &TimerState, schedule: &Schedule, now: DateTime<Utc>) -> TimerState {
    let mut next = state.clone();

    if next.in_rest {
        next.rest_time_remaining = next.rest_time_remaining.saturating_sub(1);
        if next.rest_time_remaining == 0 {
            // The next set's first interval is already staged
            next.in_rest = false;
            tracing::debug!("Rest finished, starting set {}", next.current_set_index + 1);
        }
    } else if next.in_pause {
        next.pause_time_remaining = next.pause_time_remaining.saturating_sub(1);
        if next.pause_time_remaining == 0 {
            next.in_pause = false;
            advance(&mut next, schedule, now);
        }
    } else {
        next.time_remaining = next.time_remaining.saturating_sub(1);
        if next.time_remaining == 0 {
            let pause = schedule
                .interval_at(next.position())
                .map(|i| i.pause_after_seconds)
                .unwrap_or(0);

            if pause > 0 {
                next.in_pause = true;
                next.pause_time_remaining = pause;
                tracing::debug!("Entering {}s pause", pause);
            } else {
                advance(&mut next, schedule, now);
            }
        }
    }

    next
}

/// Move to the next interval, the next set (through a rest), or completion
fn advance(next: &mut TimerState, schedule: &Schedule, now: DateTime<Utc>) {
    let finished_set = next.current_set_index;

    let same_set = Position::new(finished_set, next.current_interval_index + 1);
    if let Some(interval) = schedule.interval_at(same_set) {
        next.current_interval_index = same_set.interval_index;
        next.time_remaining = interval.duration_seconds;
        tracing::debug!("Advanced to interval '{}'", interval.label);
        return;
    }

    let next_set = Position::new(finished_set + 1, 0);
    if let Some(interval) = schedule.interval_at(next_set) {
        next.current_set_index = next_set.set_index;
        next.current_interval_index = 0;
        next.time_remaining = interval.duration_seconds;

        let rest = schedule.rest_after(finished_set);
        if rest > 0 {
            next.in_rest = true;
            next.rest_time_remaining = rest;
            tracing::debug!("Entering {}s rest before set {}", rest, next_set.set_index + 1);
        } else {
            tracing::debug!("Advanced to set {}", next_set.set_index + 1);
        }
        return;
    }

    next.running = false;
    next.paused = false;
    next.time_remaining = 0;
    next.in_pause = false;
    next.pause_time_remaining = 0;
    next.in_rest = false;
    next.rest_time_remaining = 0;
    next.end_time = Some(now);
}
