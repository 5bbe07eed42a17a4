//! Derived progress and display queries.
//!
//! Pure functions of a [`TimerState`] and its [`Schedule`]; safe to call at
//! any frame rate.

use crate::{Phase, Position, Schedule, TimerState};

/// Format seconds as `MM:SS` (minutes are not wrapped at 60)
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Remaining time of the active phase, labelled for rest and pause
pub fn format_remaining(state: &TimerState) -> String {
    if state.in_rest {
        format!("Rest: {}", format_clock(state.rest_time_remaining))
    } else if state.in_pause {
        format!("Pause: {}", format_clock(state.pause_time_remaining))
    } else {
        format_clock(state.time_remaining)
    }
}

/// Configured length of the phase the state is in
pub fn phase_duration(state: &TimerState, schedule: &Schedule) -> u32 {
    match state.phase() {
        // The rest belongs to the set before the staged one
        Phase::Rest => state
            .current_set_index
            .checked_sub(1)
            .map(|previous| schedule.rest_after(previous))
            .unwrap_or(0),
        Phase::Pause => schedule
            .interval_at(state.position())
            .map(|i| i.pause_after_seconds)
            .unwrap_or(0),
        Phase::Active => schedule
            .interval_at(state.position())
            .map(|i| i.duration_seconds)
            .unwrap_or(0),
        Phase::Complete => 0,
    }
}

/// Percent (0–100) of the active phase already elapsed
///
/// A phase hands over on the tick its counter reaches zero, so 100 is only
/// ever reported at `Phase::Complete`.
pub fn current_phase_progress(state: &TimerState, schedule: &Schedule) -> f64 {
    if state.is_complete() {
        return 100.0;
    }

    let configured = phase_duration(state, schedule);
    if configured == 0 {
        return 0.0;
    }

    let remaining = state.phase_remaining().min(configured);
    percent(u64::from(configured - remaining), u64::from(configured))
}

/// Seconds of schedule time consumed so far
pub fn elapsed_seconds(state: &TimerState, schedule: &Schedule) -> u64 {
    if state.is_complete() {
        return schedule.total_seconds();
    }

    let set_index = state.current_set_index;

    // Sets already finished, and every rest between them
    let mut elapsed: u64 = (0..set_index)
        .map(|s| schedule.set_seconds(s))
        .sum::<u64>();
    elapsed += (0..set_index.saturating_sub(1))
        .map(|s| u64::from(schedule.rest_after(s)))
        .sum::<u64>();

    // The rest leading into the current set
    if let Some(previous) = set_index.checked_sub(1) {
        let rest = u64::from(schedule.rest_after(previous));
        if state.in_rest {
            return elapsed + rest.saturating_sub(u64::from(state.rest_time_remaining));
        }
        elapsed += rest;
    }

    // Finished intervals of the current set
    if let Some(set) = schedule.set(set_index) {
        elapsed += set
            .intervals
            .iter()
            .take(state.current_interval_index)
            .map(|i| u64::from(i.duration_seconds) + u64::from(i.pause_after_seconds))
            .sum::<u64>();
    }

    let Some(interval) = schedule.interval_at(Position::new(
        set_index,
        state.current_interval_index,
    )) else {
        return elapsed;
    };
    let duration = u64::from(interval.duration_seconds);

    if state.in_pause {
        let pause = u64::from(interval.pause_after_seconds);
        elapsed + duration + pause.saturating_sub(u64::from(state.pause_time_remaining))
    } else {
        elapsed + duration.saturating_sub(u64::from(state.time_remaining))
    }
}

/// Percent (0–100) of the whole session elapsed
pub fn session_progress(state: &TimerState, schedule: &Schedule) -> f64 {
    percent(elapsed_seconds(state, schedule), schedule.total_seconds())
}

fn percent(done: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (done as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
}
