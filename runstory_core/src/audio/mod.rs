//! Narration audio: resolving the track for a position and keeping the
//! output in step with the timer.

pub mod output;
pub mod policy;
pub mod resolver;

pub use output::{AudioOutput, PlaybackError};
pub use policy::{decide, AudioStatus, AudioSyncPolicy, PlaybackDecision};
pub use resolver::{resolve_audio, AudioResolver};
