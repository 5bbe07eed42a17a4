//! Error types for the runstory_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for runstory_core operations
///
/// Playback failures are deliberately absent: they are reported as
/// [`crate::audio::PlaybackError`] and handled inside the audio policy.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Schedule rejected at construction (empty schedule, empty set, zero-length interval)
    #[error("Schedule validation error: {0}")]
    ScheduleValidation(String),

    /// No preset with the requested id
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),
}
