//! Audio output port.

use crate::AudioHandle;

/// Recoverable playback failure
///
/// These never leave the audio policy; the workout clock keeps running
/// whatever happens here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaybackError {
    /// The platform refused programmatic playback until the user interacts
    #[error("playback blocked until user interaction")]
    AutoplayBlocked,

    /// Asset missing or unreachable
    #[error("audio unavailable: {0}")]
    Unavailable(String),

    /// Asset present but could not be decoded
    #[error("audio decode failed: {0}")]
    Decode(String),
}

/// The device narration plays through
///
/// Only [`crate::audio::AudioSyncPolicy`] issues commands against an output.
pub trait AudioOutput {
    /// Replace the current source with `handle`
    fn load(&mut self, handle: &AudioHandle) -> Result<(), PlaybackError>;

    /// Start or continue playing the loaded source
    fn play(&mut self) -> Result<(), PlaybackError>;

    /// Pause without unloading
    fn pause(&mut self);

    fn set_muted(&mut self, muted: bool);

    /// Free the underlying decoder/device; no further commands follow
    fn release(&mut self);
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashSet;

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub(crate) enum Command {
        Load(AudioHandle),
        Play,
        Pause,
        Mute(bool),
        Release,
    }

    /// Output that records every command and fails on demand
    #[derive(Debug, Default)]
    pub(crate) struct RecordingOutput {
        pub commands: Vec<Command>,
        pub missing: HashSet<AudioHandle>,
        pub play_failure: Option<PlaybackError>,
        loaded: Option<AudioHandle>,
    }

    impl RecordingOutput {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn with_missing(handles: &[&str]) -> Self {
            Self {
                missing: handles.iter().map(|h| AudioHandle::new(*h)).collect(),
                ..Self::default()
            }
        }

        pub(crate) fn count(&self, wanted: &Command) -> usize {
            self.commands.iter().filter(|c| *c == wanted).count()
        }

        pub(crate) fn last_load(&self) -> Option<&AudioHandle> {
            self.commands.iter().rev().find_map(|c| match c {
                Command::Load(h) => Some(h),
                _ => None,
            })
        }
    }

    impl AudioOutput for RecordingOutput {
        fn load(&mut self, handle: &AudioHandle) -> Result<(), PlaybackError> {
            self.commands.push(Command::Load(handle.clone()));
            if self.missing.contains(handle) {
                self.loaded = None;
                return Err(PlaybackError::Unavailable(handle.to_string()));
            }
            self.loaded = Some(handle.clone());
            Ok(())
        }

        fn play(&mut self) -> Result<(), PlaybackError> {
            self.commands.push(Command::Play);
            match &self.play_failure {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }

        fn pause(&mut self) {
            self.commands.push(Command::Pause);
        }

        fn set_muted(&mut self, muted: bool) {
            self.commands.push(Command::Mute(muted));
        }

        fn release(&mut self) {
            self.commands.push(Command::Release);
        }
    }
}
