//! Schedule construction, validation and timing arithmetic.
//!
//! A [`Schedule`] can only be built through [`Schedule::new`] (or serde,
//! which routes through the same validation), so every other module may
//! rely on a non-empty list of non-empty sets.

use crate::{Error, Interval, Phase, Position, Result, Schedule, WorkoutSet};
use serde::{Deserialize, Serialize};

impl Schedule {
    /// Validate and build a schedule
    ///
    /// Rejects an empty set list, a set without intervals and intervals
    /// with a zero duration.
    pub fn new(sets: Vec<WorkoutSet>) -> Result<Self> {
        if sets.is_empty() {
            return Err(Error::ScheduleValidation(
                "schedule must contain at least one set".into(),
            ));
        }

        for (set_index, set) in sets.iter().enumerate() {
            if set.intervals.is_empty() {
                return Err(Error::ScheduleValidation(format!(
                    "set {} has no intervals",
                    set_index + 1
                )));
            }

            if let Some(interval) = set.intervals.iter().find(|i| i.duration_seconds == 0) {
                return Err(Error::ScheduleValidation(format!(
                    "interval '{}' in set {} has a zero duration",
                    interval.label,
                    set_index + 1
                )));
            }
        }

        Ok(Self { sets })
    }

    pub fn sets(&self) -> &[WorkoutSet] {
        &self.sets
    }

    pub fn set(&self, set_index: usize) -> Option<&WorkoutSet> {
        self.sets.get(set_index)
    }

    pub fn interval_at(&self, position: Position) -> Option<&Interval> {
        self.sets
            .get(position.set_index)
            .and_then(|s| s.intervals.get(position.interval_index))
    }

    pub(crate) fn first_interval(&self) -> &Interval {
        // Non-empty by construction
        &self.sets[0].intervals[0]
    }

    pub fn set_count(&self) -> usize {
        self.sets.len()
    }

    /// Number of intervals across every set
    pub fn interval_count(&self) -> usize {
        self.sets.iter().map(|s| s.intervals.len()).sum()
    }

    /// Index of `position` in flattened set/interval order
    pub fn flat_index(&self, position: Position) -> usize {
        let before: usize = self
            .sets
            .iter()
            .take(position.set_index)
            .map(|s| s.intervals.len())
            .sum();
        before + position.interval_index
    }

    /// Rest that actually runs after `set_index` (zero for the final set)
    pub fn rest_after(&self, set_index: usize) -> u32 {
        if set_index + 1 >= self.sets.len() {
            return 0;
        }
        self.sets
            .get(set_index)
            .map(|s| s.rest_after_seconds)
            .unwrap_or(0)
    }

    /// Seconds spent inside a set: every interval plus its pause
    pub fn set_seconds(&self, set_index: usize) -> u64 {
        self.sets
            .get(set_index)
            .map(|s| {
                s.intervals
                    .iter()
                    .map(|i| u64::from(i.duration_seconds) + u64::from(i.pause_after_seconds))
                    .sum()
            })
            .unwrap_or(0)
    }

    /// Total scheduled time
    ///
    /// Every interval, every pause, and every rest that is followed by
    /// another set. The final set's rest never runs.
    pub fn total_seconds(&self) -> u64 {
        (0..self.sets.len())
            .map(|i| self.set_seconds(i) + u64::from(self.rest_after(i)))
            .sum()
    }

    /// The ordered phases a session passes through, zero-length phases omitted
    pub fn segments(&self) -> Vec<Segment> {
        let mut segments = Vec::new();

        for (set_index, set) in self.sets.iter().enumerate() {
            if set_index > 0 {
                let rest = self.rest_after(set_index - 1);
                if rest > 0 {
                    segments.push(Segment {
                        phase: Phase::Rest,
                        position: Position::new(set_index, 0),
                        seconds: rest,
                    });
                }
            }

            for (interval_index, interval) in set.intervals.iter().enumerate() {
                let position = Position::new(set_index, interval_index);
                segments.push(Segment {
                    phase: Phase::Active,
                    position,
                    seconds: interval.duration_seconds,
                });
                if interval.pause_after_seconds > 0 {
                    segments.push(Segment {
                        phase: Phase::Pause,
                        position,
                        seconds: interval.pause_after_seconds,
                    });
                }
            }
        }

        segments
    }
}

impl TryFrom<Vec<WorkoutSet>> for Schedule {
    type Error = Error;

    fn try_from(sets: Vec<WorkoutSet>) -> Result<Self> {
        Schedule::new(sets)
    }
}

impl From<Schedule> for Vec<WorkoutSet> {
    fn from(schedule: Schedule) -> Self {
        schedule.sets
    }
}

/// One contiguous phase of a schedule, as reported by [`Schedule::segments`]
///
/// A rest segment carries the position of the interval it precedes, which
/// is where the engine stages the next set while resting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    pub phase: Phase,
    pub position: Position,
    pub seconds: u32,
}

// ============================================================================
// Uniform schedules from user settings
// ============================================================================

/// Settings for a uniform workout (every set identical)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkoutSettings {
    #[serde(default = "default_sets")]
    pub sets: u32,

    #[serde(default = "default_intervals_per_set")]
    pub intervals_per_set: u32,

    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u32,

    #[serde(default = "default_pause_seconds")]
    pub pause_seconds: u32,

    #[serde(default = "default_rest_seconds")]
    pub rest_seconds: u32,
}

impl Default for WorkoutSettings {
    fn default() -> Self {
        Self {
            sets: default_sets(),
            intervals_per_set: default_intervals_per_set(),
            interval_seconds: default_interval_seconds(),
            pause_seconds: default_pause_seconds(),
            rest_seconds: default_rest_seconds(),
        }
    }
}

fn default_sets() -> u32 {
    2
}

fn default_intervals_per_set() -> u32 {
    3
}

fn default_interval_seconds() -> u32 {
    30
}

fn default_pause_seconds() -> u32 {
    10
}

fn default_rest_seconds() -> u32 {
    60
}

impl WorkoutSettings {
    /// Build the schedule these settings describe
    pub fn to_schedule(&self) -> Result<Schedule> {
        let sets = (0..self.sets)
            .map(|s| WorkoutSet {
                intervals: (0..self.intervals_per_set)
                    .map(|i| Interval {
                        id: format!("s{}i{}", s + 1, i + 1),
                        label: format!("Set {} · Interval {}", s + 1, i + 1),
                        duration_seconds: self.interval_seconds,
                        pause_after_seconds: self.pause_seconds,
                    })
                    .collect(),
                rest_after_seconds: self.rest_seconds,
            })
            .collect();

        Schedule::new(sets)
    }
}
