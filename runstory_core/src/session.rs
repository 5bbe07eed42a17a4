//! A narrated workout session: engine, audio policy and narration wired
//! together.
//!
//! Every control call and tick goes to the engine first; if the snapshot
//! changed, the audio policy observes it before the call returns, so audio
//! commands can never get ahead of or behind the phase they belong to.

use crate::audio::{AudioOutput, AudioStatus, AudioSyncPolicy};
use crate::config::AudioConfig;
use crate::driver::{Clock, TickDriver};
use crate::engine::{SubscriptionId, TimerEngine};
use crate::{Narration, Schedule, TimerState};

pub struct Session<D: TickDriver, O: AudioOutput> {
    engine: TimerEngine<D>,
    audio: AudioSyncPolicy<O>,
    narration: Narration,
}

impl<D: TickDriver, O: AudioOutput> Session<D, O> {
    pub fn new(
        schedule: Schedule,
        narration: Narration,
        driver: D,
        output: O,
        audio_config: &AudioConfig,
    ) -> Self {
        let audio = AudioSyncPolicy::new(output, narration.audio.clone(), audio_config);
        Self {
            engine: TimerEngine::with_schedule(schedule, driver),
            audio,
            narration,
        }
    }

    /// Replace the engine's timestamp source
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.engine.set_clock(clock);
        self
    }

    fn sync_audio(&mut self, changed: bool) -> bool {
        if changed {
            if let (Some(state), Some(schedule)) = (self.engine.state(), self.engine.schedule()) {
                self.audio.observe(state, schedule);
            }
        }
        changed
    }

    // ------------------------------------------------------------------------
    // Controls
    // ------------------------------------------------------------------------

    pub fn start(&mut self) -> bool {
        let changed = self.engine.start();
        self.sync_audio(changed)
    }

    pub fn pause(&mut self) -> bool {
        let changed = self.engine.pause();
        self.sync_audio(changed)
    }

    pub fn resume(&mut self) -> bool {
        let changed = self.engine.resume();
        self.sync_audio(changed)
    }

    /// Pause when running, resume when paused, start otherwise
    pub fn toggle(&mut self) -> bool {
        let Some(state) = self.engine.state() else {
            return false;
        };
        match (state.running, state.paused) {
            (true, true) => self.resume(),
            (true, false) => self.pause(),
            (false, _) => self.start(),
        }
    }

    pub fn reset(&mut self) -> bool {
        let changed = self.engine.reset();
        self.sync_audio(changed)
    }

    /// Called by the driver once per elapsed second
    pub fn tick(&mut self) -> bool {
        let changed = self.engine.tick();
        self.sync_audio(changed)
    }

    /// Tear the session down; the driver and audio output are released
    pub fn discard(self) {
        drop(self);
    }

    fn teardown(&mut self) {
        self.engine.discard();
        self.audio.release();
    }

    // ------------------------------------------------------------------------
    // Audio controls and callbacks
    // ------------------------------------------------------------------------

    pub fn toggle_mute(&mut self) -> bool {
        self.audio.toggle_mute()
    }

    pub fn user_gesture(&mut self) {
        self.audio.user_gesture();
    }

    pub fn report_playback_error(&mut self, err: crate::audio::PlaybackError) {
        self.audio.report_error(err);
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn state(&self) -> Option<&TimerState> {
        self.engine.state()
    }

    pub fn schedule(&self) -> Option<&Schedule> {
        self.engine.schedule()
    }

    pub fn format_remaining(&self) -> Option<String> {
        self.engine.format_remaining()
    }

    pub fn phase_progress(&self) -> Option<f64> {
        self.engine.phase_progress()
    }

    pub fn session_progress(&self) -> Option<f64> {
        self.engine.session_progress()
    }

    /// Story text for the current interval
    pub fn narration_text(&self) -> Option<&str> {
        let state = self.engine.state()?;
        let schedule = self.engine.schedule()?;
        self.narration.text_at(state.position(), schedule)
    }

    pub fn audio_status(&self) -> AudioStatus {
        self.audio.status()
    }

    pub fn audio(&self) -> &AudioSyncPolicy<O> {
        &self.audio
    }

    pub fn driver(&self) -> &D {
        self.engine.driver()
    }

    pub fn driver_mut(&mut self) -> &mut D {
        self.engine.driver_mut()
    }

    /// Register a presentation-layer observer of timer snapshots
    pub fn subscribe(&mut self, observer: impl FnMut(&TimerState) + 'static) -> SubscriptionId {
        self.engine.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.engine.unsubscribe(id)
    }
}

impl<D: TickDriver, O: AudioOutput> Drop for Session<D, O> {
    fn drop(&mut self) {
        self.teardown();
    }
}
