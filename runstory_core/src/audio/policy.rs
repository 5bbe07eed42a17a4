//! Phase-driven narration playback.
//!
//! The policy looks at nothing but the latest [`TimerState`]: narration
//! plays while an interval is counting down and is paused otherwise.
//! Playback failures are absorbed here. A failing track is replaced by the
//! silent placeholder at most `retry_limit` times, after which the policy
//! reports the audio as unavailable and stops trying until the timer moves
//! on to a different track. Nothing in this module can stop the clock.

use super::output::{AudioOutput, PlaybackError};
use super::resolver::AudioResolver;
use crate::config::AudioConfig;
use crate::{AudioHandle, NarrationAudio, Schedule, TimerState};

/// What the audio output should be doing for a given timer state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackDecision {
    Play,
    Pause,
}

/// Play only while an interval is actively counting down
pub fn decide(state: &TimerState) -> PlaybackDecision {
    if state.running && !state.paused && !state.in_pause && !state.in_rest {
        PlaybackDecision::Play
    } else {
        PlaybackDecision::Pause
    }
}

/// Playback condition as shown to the user
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioStatus {
    /// Nothing requested yet
    Idle,
    Playing,
    Paused,
    /// Platform blocked autoplay; waiting for a tap
    AwaitingGesture,
    /// Narration failed and the silent placeholder is standing in
    Substituted,
    /// Retry limit reached for the current track
    Unavailable,
}

impl AudioStatus {
    /// Non-blocking advisory text, if any
    pub fn advisory(&self) -> Option<&'static str> {
        match self {
            AudioStatus::AwaitingGesture => Some("Tap to play narration"),
            AudioStatus::Substituted => Some("Narration failed to load, continuing in silence"),
            AudioStatus::Unavailable => Some("Audio unavailable"),
            AudioStatus::Idle | AudioStatus::Playing | AudioStatus::Paused => None,
        }
    }
}

/// Keeps an [`AudioOutput`] in step with the timer
pub struct AudioSyncPolicy<O: AudioOutput> {
    output: O,
    resolver: AudioResolver,
    retry_limit: u32,
    /// Track the timer position calls for
    target: Option<AudioHandle>,
    /// Track actually loaded on the output
    loaded: Option<AudioHandle>,
    error_count: u32,
    status: AudioStatus,
    wants_play: bool,
    playing: bool,
    muted: bool,
    released: bool,
}

impl<O: AudioOutput> AudioSyncPolicy<O> {
    pub fn new(output: O, narration: Option<NarrationAudio>, config: &AudioConfig) -> Self {
        let mut policy = Self {
            output,
            resolver: AudioResolver::new(narration, config.silent_track.clone()),
            retry_limit: config.retry_limit,
            target: None,
            loaded: None,
            error_count: 0,
            status: AudioStatus::Idle,
            wants_play: false,
            playing: false,
            muted: false,
            released: false,
        };
        if config.start_muted {
            policy.set_muted(true);
        }
        policy
    }

    // ------------------------------------------------------------------------
    // Timer-driven decisions
    // ------------------------------------------------------------------------

    /// React to a new timer snapshot; call once per change, in order
    pub fn observe(&mut self, state: &TimerState, schedule: &Schedule) {
        if self.released {
            return;
        }

        match decide(state) {
            PlaybackDecision::Play => {
                self.wants_play = true;
                let target = self.resolver.resolve(state.position(), schedule);
                if self.target.as_ref() != Some(&target) {
                    self.switch_to(target);
                }
                if !self.playing {
                    self.start_playback();
                }
            }
            PlaybackDecision::Pause => {
                self.wants_play = false;
                if self.playing {
                    self.output.pause();
                    self.playing = false;
                }
                if matches!(self.status, AudioStatus::Playing | AudioStatus::Substituted) {
                    self.status = AudioStatus::Paused;
                }
            }
        }
    }

    /// Move to a genuinely new track; its failure history starts fresh
    fn switch_to(&mut self, target: AudioHandle) {
        tracing::debug!("Switching narration to {}", target);
        self.target = Some(target.clone());
        self.error_count = 0;
        self.status = AudioStatus::Idle;
        self.load(target);
    }

    /// Load `handle`, falling back to the placeholder on failure
    fn load(&mut self, handle: AudioHandle) -> bool {
        let mut handle = handle;
        loop {
            self.playing = false;
            match self.output.load(&handle) {
                Ok(()) => {
                    self.loaded = Some(handle);
                    return true;
                }
                Err(err) => {
                    self.loaded = None;
                    if !self.register_failure(&err) {
                        return false;
                    }
                    handle = self.resolver.placeholder().clone();
                }
            }
        }
    }

    fn start_playback(&mut self) {
        loop {
            if self.status == AudioStatus::Unavailable || self.loaded.is_none() {
                return;
            }

            match self.output.play() {
                Ok(()) => {
                    self.playing = true;
                    self.status = if self.is_substituted() {
                        AudioStatus::Substituted
                    } else {
                        AudioStatus::Playing
                    };
                    return;
                }
                Err(PlaybackError::AutoplayBlocked) => {
                    tracing::info!("Autoplay blocked, waiting for user gesture");
                    self.status = AudioStatus::AwaitingGesture;
                    return;
                }
                Err(err) => {
                    if !self.register_failure(&err) {
                        return;
                    }
                    let placeholder = self.resolver.placeholder().clone();
                    self.load(placeholder);
                }
            }
        }
    }

    /// Count a failure; true if one more substitution is allowed
    fn register_failure(&mut self, err: &PlaybackError) -> bool {
        if self.error_count >= self.retry_limit {
            tracing::warn!(
                "Narration {:?} failed ({}), retry limit {} reached",
                self.target,
                err,
                self.retry_limit
            );
            self.status = AudioStatus::Unavailable;
            self.playing = false;
            return false;
        }

        self.error_count += 1;
        self.status = AudioStatus::Substituted;
        tracing::warn!(
            "Narration {:?} failed ({}), substituting silence ({}/{})",
            self.target,
            err,
            self.error_count,
            self.retry_limit
        );
        true
    }

    fn is_substituted(&self) -> bool {
        self.loaded.as_ref() == Some(self.resolver.placeholder()) && self.loaded != self.target
    }

    // ------------------------------------------------------------------------
    // Platform callbacks and user controls
    // ------------------------------------------------------------------------

    /// Asynchronous failure reported by the platform after load/play
    pub fn report_error(&mut self, err: PlaybackError) {
        if self.released {
            return;
        }
        self.playing = false;

        if err == PlaybackError::AutoplayBlocked {
            tracing::info!("Autoplay blocked, waiting for user gesture");
            self.status = AudioStatus::AwaitingGesture;
            return;
        }

        if !self.register_failure(&err) {
            self.output.pause();
            return;
        }

        let placeholder = self.resolver.placeholder().clone();
        if self.load(placeholder) && self.wants_play {
            self.start_playback();
        }
    }

    /// The user tapped play after an autoplay rejection
    pub fn user_gesture(&mut self) {
        if self.released || self.status != AudioStatus::AwaitingGesture {
            return;
        }
        self.status = AudioStatus::Idle;
        if self.wants_play {
            self.start_playback();
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        if self.released {
            return;
        }
        self.muted = muted;
        self.output.set_muted(muted);
    }

    /// Flip mute; returns the new value
    pub fn toggle_mute(&mut self) -> bool {
        let muted = !self.muted;
        self.set_muted(muted);
        self.muted
    }

    /// Stop and free the output; later calls are ignored
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        if self.playing {
            self.output.pause();
        }
        self.output.release();
        self.released = true;
        self.playing = false;
        self.wants_play = false;
        tracing::debug!("Released audio output");
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn status(&self) -> AudioStatus {
        self.status
    }

    pub fn advisory(&self) -> Option<&'static str> {
        self.status.advisory()
    }

    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    pub fn target(&self) -> Option<&AudioHandle> {
        self.target.as_ref()
    }

    pub fn loaded(&self) -> Option<&AudioHandle> {
        self.loaded.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn output(&self) -> &O {
        &self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::output::testing::{Command, RecordingOutput};
    use crate::schedule::tests::two_set_schedule;
    use crate::{Segmented, WorkoutSettings};
    use uuid::Uuid;

    fn running_state(schedule: &Schedule) -> TimerState {
        let mut state = TimerState::initial(schedule, Uuid::new_v4());
        state.running = true;
        state
    }

    fn per_set_audio() -> Option<NarrationAudio> {
        Some(Segmented::PerSet(vec![
            AudioHandle::new("set1.mp3"),
            AudioHandle::new("set2.mp3"),
        ]))
    }

    fn policy_with(output: RecordingOutput, retry_limit: u32) -> AudioSyncPolicy<RecordingOutput> {
        let config = AudioConfig {
            retry_limit,
            ..AudioConfig::default()
        };
        AudioSyncPolicy::new(output, per_set_audio(), &config)
    }

    #[test]
    fn test_rest_always_pauses() {
        let schedule = two_set_schedule();
        let mut state = running_state(&schedule);
        state.in_rest = true;

        for (running, paused) in [(true, false), (true, true), (false, false), (false, true)] {
            state.running = running;
            state.paused = paused;
            assert_eq!(decide(&state), PlaybackDecision::Pause);
        }
    }

    #[test]
    fn test_active_running_always_plays() {
        let schedule = two_set_schedule();
        let state = running_state(&schedule);
        assert_eq!(decide(&state), PlaybackDecision::Play);

        let mut paused = state.clone();
        paused.paused = true;
        assert_eq!(decide(&paused), PlaybackDecision::Pause);

        let mut in_pause = state.clone();
        in_pause.in_pause = true;
        assert_eq!(decide(&in_pause), PlaybackDecision::Pause);

        let idle = TimerState::initial(&schedule, Uuid::new_v4());
        assert_eq!(decide(&idle), PlaybackDecision::Pause);
    }

    #[test]
    fn test_loads_and_plays_resolved_track() {
        let schedule = two_set_schedule();
        let mut policy = policy_with(RecordingOutput::new(), 3);

        policy.observe(&running_state(&schedule), &schedule);
        assert_eq!(
            policy.output().commands,
            vec![Command::Load(AudioHandle::new("set1.mp3")), Command::Play]
        );
        assert_eq!(policy.status(), AudioStatus::Playing);

        // Same track, already playing: nothing more to do
        policy.observe(&running_state(&schedule), &schedule);
        assert_eq!(policy.output().commands.len(), 2);
    }

    #[test]
    fn test_pause_issued_before_next_play() {
        let schedule = two_set_schedule();
        let mut policy = policy_with(RecordingOutput::new(), 3);
        let active = running_state(&schedule);
        let mut pausing = active.clone();
        pausing.in_pause = true;
        pausing.pause_time_remaining = 2;

        policy.observe(&active, &schedule);
        policy.observe(&pausing, &schedule);
        policy.observe(&active, &schedule);

        assert_eq!(
            policy.output().commands,
            vec![
                Command::Load(AudioHandle::new("set1.mp3")),
                Command::Play,
                Command::Pause,
                Command::Play,
            ]
        );
    }

    #[test]
    fn test_new_set_switches_track() {
        let schedule = two_set_schedule();
        let mut policy = policy_with(RecordingOutput::new(), 3);
        let mut state = running_state(&schedule);
        policy.observe(&state, &schedule);

        state.current_set_index = 1;
        policy.observe(&state, &schedule);

        assert_eq!(policy.target().unwrap().as_str(), "set2.mp3");
        assert_eq!(policy.output().last_load().unwrap().as_str(), "set2.mp3");
        assert!(policy.is_playing());
    }

    #[test]
    fn test_missing_track_substitutes_silence() {
        let schedule = two_set_schedule();
        let mut policy = policy_with(RecordingOutput::with_missing(&["set1.mp3"]), 3);

        policy.observe(&running_state(&schedule), &schedule);

        assert_eq!(policy.error_count(), 1);
        assert_eq!(policy.status(), AudioStatus::Substituted);
        assert_eq!(policy.loaded().unwrap().as_str(), "builtin:silence");
        assert!(policy.is_playing());
        assert!(policy.advisory().is_some());
    }

    #[test]
    fn test_substitution_bounded_when_placeholder_fails() {
        let schedule = two_set_schedule();
        let output = RecordingOutput::with_missing(&["set1.mp3", "builtin:silence"]);
        let mut policy = policy_with(output, 3);
        let state = running_state(&schedule);

        for _ in 0..20 {
            policy.observe(&state, &schedule);
            assert!(policy.error_count() <= 3);
        }

        assert_eq!(policy.status(), AudioStatus::Unavailable);
        assert_eq!(policy.advisory(), Some("Audio unavailable"));
        // one narration load plus three placeholder attempts, then nothing
        assert_eq!(policy.output().commands.len(), 4);
        assert_eq!(policy.output().count(&Command::Play), 0);
    }

    #[test]
    fn test_play_failures_bounded() {
        let schedule = two_set_schedule();
        let mut output = RecordingOutput::new();
        output.play_failure = Some(PlaybackError::Decode("corrupt frame".into()));
        let mut policy = policy_with(output, 2);

        policy.observe(&running_state(&schedule), &schedule);

        assert_eq!(policy.error_count(), 2);
        assert_eq!(policy.status(), AudioStatus::Unavailable);
        assert_eq!(policy.output().count(&Command::Play), 3);
    }

    #[test]
    fn test_new_track_resets_error_counter() {
        let schedule = two_set_schedule();
        let output = RecordingOutput::with_missing(&["set1.mp3", "builtin:silence"]);
        let mut policy = policy_with(output, 1);
        let mut state = running_state(&schedule);

        policy.observe(&state, &schedule);
        assert_eq!(policy.status(), AudioStatus::Unavailable);

        state.current_set_index = 1;
        policy.observe(&state, &schedule);
        assert_eq!(policy.error_count(), 0);
        assert_eq!(policy.status(), AudioStatus::Playing);
    }

    #[test]
    fn test_async_error_reported_after_play() {
        let schedule = two_set_schedule();
        let mut policy = policy_with(RecordingOutput::new(), 3);
        policy.observe(&running_state(&schedule), &schedule);

        policy.report_error(PlaybackError::Unavailable("404".into()));

        assert_eq!(policy.error_count(), 1);
        assert_eq!(policy.status(), AudioStatus::Substituted);
        assert_eq!(policy.output().last_load().unwrap().as_str(), "builtin:silence");
        assert!(policy.is_playing());
    }

    #[test]
    fn test_autoplay_block_waits_for_gesture() {
        let schedule = two_set_schedule();
        let mut output = RecordingOutput::new();
        output.play_failure = Some(PlaybackError::AutoplayBlocked);
        let mut policy = policy_with(output, 3);
        let state = running_state(&schedule);

        policy.observe(&state, &schedule);
        assert_eq!(policy.status(), AudioStatus::AwaitingGesture);
        assert_eq!(policy.error_count(), 0);
        assert_eq!(policy.advisory(), Some("Tap to play narration"));

        // Ticks keep coming; each retries quietly without counting errors
        policy.observe(&state, &schedule);
        assert_eq!(policy.error_count(), 0);
    }

    #[test]
    fn test_gesture_resumes_playback() {
        let schedule = two_set_schedule();
        let mut policy = policy_with(RecordingOutput::new(), 3);
        policy.observe(&running_state(&schedule), &schedule);
        policy.report_error(PlaybackError::AutoplayBlocked);
        assert!(!policy.is_playing());

        policy.user_gesture();
        assert!(policy.is_playing());
        assert_eq!(policy.status(), AudioStatus::Playing);
    }

    #[test]
    fn test_mute_is_independent_of_phase() {
        let schedule = two_set_schedule();
        let mut policy = policy_with(RecordingOutput::new(), 3);
        policy.observe(&running_state(&schedule), &schedule);

        assert!(policy.toggle_mute());
        assert!(policy.is_playing());
        assert!(!policy.toggle_mute());
        assert_eq!(policy.output().count(&Command::Mute(true)), 1);
        assert_eq!(policy.output().count(&Command::Pause), 0);
    }

    #[test]
    fn test_start_muted() {
        let config = AudioConfig {
            start_muted: true,
            ..AudioConfig::default()
        };
        let policy = AudioSyncPolicy::new(RecordingOutput::new(), None, &config);
        assert!(policy.is_muted());
        assert_eq!(policy.output().commands, vec![Command::Mute(true)]);
    }

    #[test]
    fn test_no_narration_plays_placeholder() {
        let schedule = WorkoutSettings::default().to_schedule().unwrap();
        let mut policy =
            AudioSyncPolicy::new(RecordingOutput::new(), None, &AudioConfig::default());
        policy.observe(&running_state(&schedule), &schedule);

        assert_eq!(policy.loaded().unwrap().as_str(), "builtin:silence");
        assert_eq!(policy.status(), AudioStatus::Playing);
    }

    #[test]
    fn test_release_is_final() {
        let schedule = two_set_schedule();
        let mut policy = policy_with(RecordingOutput::new(), 3);
        policy.observe(&running_state(&schedule), &schedule);

        policy.release();
        policy.release();
        policy.observe(&running_state(&schedule), &schedule);

        let commands = &policy.output().commands;
        assert_eq!(commands.last(), Some(&Command::Release));
        assert_eq!(policy.output().count(&Command::Release), 1);
        assert_eq!(policy.output().count(&Command::Pause), 1);
    }
}
