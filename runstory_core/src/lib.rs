#![forbid(unsafe_code)]

//! Core engine for narrated interval workouts.
//!
//! This crate provides:
//! - Schedule model (sets, intervals, pauses, rests) and validation
//! - Timer engine publishing immutable state snapshots
//! - Progress and display queries
//! - Narration lookup and the phase-driven audio policy
//! - Session wiring, presets, configuration and logging

pub mod types;
pub mod error;
pub mod schedule;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod driver;
pub mod engine;
pub mod progress;
pub mod narration;
pub mod audio;
pub mod session;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use schedule::{Segment, WorkoutSettings};
pub use catalog::{get_default_catalog, Catalog, Preset};
pub use config::{AudioConfig, Config};
pub use driver::{Clock, ManualDriver, SystemClock, TickDriver};
pub use engine::{SubscriptionId, TimerEngine};
pub use progress::{current_phase_progress, format_clock, format_remaining, session_progress};
pub use audio::{AudioOutput, AudioStatus, AudioSyncPolicy, PlaybackDecision, PlaybackError};
pub use session::Session;
