//! Core domain types for the runstory system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Intervals, sets and schedules (the static workout description)
//! - Timer positions, phases and state snapshots
//! - Narration content keyed by position

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Schedule Types
// ============================================================================

/// One exercise bout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Interval {
    pub id: String,
    pub label: String,
    pub duration_seconds: u32,
    /// Recovery taken right after this interval, before the next one in the same set
    #[serde(default)]
    pub pause_after_seconds: u32,
}

/// An ordered group of intervals sharing a trailing rest period
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkoutSet {
    pub intervals: Vec<Interval>,
    /// Rest taken after the last interval, before the next set begins
    #[serde(default)]
    pub rest_after_seconds: u32,
}

/// The complete, validated timing description of a session
///
/// Construct with [`Schedule::new`]; fields are private so the invariants
/// (at least one set, every set non-empty, every interval longer than zero)
/// hold for the lifetime of the value.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "Vec<WorkoutSet>", into = "Vec<WorkoutSet>")]
pub struct Schedule {
    pub(crate) sets: Vec<WorkoutSet>,
}

/// Coordinates of an interval inside a schedule (both 0-based)
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Position {
    pub set_index: usize,
    pub interval_index: usize,
}

impl Position {
    pub fn new(set_index: usize, interval_index: usize) -> Self {
        Self {
            set_index,
            interval_index,
        }
    }
}

// ============================================================================
// Timer State Types
// ============================================================================

/// The engine's current mode
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Counting down an interval
    Active,
    /// Counting down the pause after the interval just finished
    Pause,
    /// Counting down the rest after the set just finished
    Rest,
    /// Terminal
    Complete,
}

/// Immutable snapshot of engine progress
///
/// The engine never mutates a published snapshot; every control call and
/// every tick produces a new value.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimerState {
    pub session_id: Uuid,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub current_set_index: usize,
    pub current_interval_index: usize,
    pub running: bool,
    pub paused: bool,
    pub time_remaining: u32,
    pub in_pause: bool,
    pub pause_time_remaining: u32,
    pub in_rest: bool,
    pub rest_time_remaining: u32,
}

impl TimerState {
    /// Initial configuration for a schedule: set 0, interval 0, full duration, not running
    pub fn initial(schedule: &Schedule, session_id: Uuid) -> Self {
        Self {
            session_id,
            start_time: None,
            end_time: None,
            current_set_index: 0,
            current_interval_index: 0,
            running: false,
            paused: false,
            time_remaining: schedule.first_interval().duration_seconds,
            in_pause: false,
            pause_time_remaining: 0,
            in_rest: false,
            rest_time_remaining: 0,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.current_set_index, self.current_interval_index)
    }

    /// Terminal state: not running, nothing left to count, no recovery phase active
    pub fn is_complete(&self) -> bool {
        !self.running && self.time_remaining == 0 && !self.in_pause && !self.in_rest
    }

    pub fn phase(&self) -> Phase {
        if self.is_complete() {
            Phase::Complete
        } else if self.in_rest {
            Phase::Rest
        } else if self.in_pause {
            Phase::Pause
        } else {
            Phase::Active
        }
    }

    /// Seconds left in whichever phase is active
    pub fn phase_remaining(&self) -> u32 {
        match self.phase() {
            Phase::Rest => self.rest_time_remaining,
            Phase::Pause => self.pause_time_remaining,
            Phase::Active => self.time_remaining,
            Phase::Complete => 0,
        }
    }

    /// True while the clock is consuming schedule time
    pub fn is_ticking(&self) -> bool {
        self.running && !self.paused
    }
}

// ============================================================================
// Narration Types
// ============================================================================

/// Opaque reference to an audio asset (file path, URL or built-in name)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct AudioHandle(String);

impl AudioHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AudioHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AudioHandle {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Content that is either shared by the whole schedule or split by position
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", content = "items", rename_all = "snake_case")]
pub enum Segmented<T> {
    /// One item for the whole schedule
    Single(T),
    /// One item per set, the last one reused past the end of the list
    PerSet(Vec<T>),
    /// One item per interval in flattened set/interval order, the last one reused
    PerInterval(Vec<T>),
}

/// Narration audio: one track, or a list of tracks keyed by position
pub type NarrationAudio = Segmented<AudioHandle>;

/// Narration text blocks keyed the same way as the audio
pub type NarrationText = Segmented<String>;

/// Story content supplied by the story-generation and text-to-speech collaborators
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Narration {
    #[serde(default)]
    pub text: Option<NarrationText>,
    #[serde(default)]
    pub audio: Option<NarrationAudio>,
}
