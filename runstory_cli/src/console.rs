//! Terminal stand-ins for the audio device and the presentation layer.

use runstory_core::{
    AudioHandle, AudioOutput, Phase, PlaybackError, Session, TickDriver, TimerState,
};
use std::path::Path;

/// Audio "device" that narrates its commands on stdout
///
/// Built-in handles and URLs are always accepted; anything else is treated
/// as a local file and must exist.
#[derive(Debug, Default)]
pub struct ConsoleAudio {
    loaded: Option<AudioHandle>,
    muted: bool,
}

impl ConsoleAudio {
    pub fn new() -> Self {
        Self::default()
    }
}

fn is_reachable(handle: &AudioHandle) -> bool {
    let raw = handle.as_str();
    raw.starts_with("builtin:")
        || raw.starts_with("http://")
        || raw.starts_with("https://")
        || Path::new(raw).exists()
}

impl AudioOutput for ConsoleAudio {
    fn load(&mut self, handle: &AudioHandle) -> Result<(), PlaybackError> {
        if !is_reachable(handle) {
            self.loaded = None;
            return Err(PlaybackError::Unavailable(format!("{} not found", handle)));
        }
        tracing::debug!("Loaded {}", handle);
        self.loaded = Some(handle.clone());
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        match &self.loaded {
            Some(handle) => {
                let suffix = if self.muted { " (muted)" } else { "" };
                println!("  ♪ playing {}{}", handle, suffix);
                Ok(())
            }
            None => Err(PlaybackError::Unavailable("nothing loaded".into())),
        }
    }

    fn pause(&mut self) {
        println!("  ♪ paused");
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        println!("  ♪ {}", if muted { "muted" } else { "unmuted" });
    }

    fn release(&mut self) {
        self.loaded = None;
        tracing::debug!("Audio output released");
    }
}

/// Prints session progress, repeating only what changed
#[derive(Default)]
pub struct Reporter {
    every_tick: bool,
    last_phase: Option<(Phase, usize, usize)>,
    last_text: Option<String>,
    last_advisory: Option<&'static str>,
}

impl Reporter {
    /// `every_tick` prints a line per second; otherwise only on phase changes
    pub fn new(every_tick: bool) -> Self {
        Self {
            every_tick,
            ..Self::default()
        }
    }

    pub fn report<D: TickDriver>(&mut self, session: &Session<D, ConsoleAudio>) {
        let Some(state) = session.state() else {
            return;
        };

        let key = (state.phase(), state.current_set_index, state.current_interval_index);
        let phase_changed = self.last_phase != Some(key);
        self.last_phase = Some(key);

        if phase_changed || self.every_tick {
            println!("{}", status_line(session, state));
        }

        let text = session.narration_text().map(str::to_string);
        if text != self.last_text {
            if let Some(t) = &text {
                println!("  » {}", t);
            }
        }
        self.last_text = text;

        let advisory = session.audio().advisory();
        if advisory != self.last_advisory {
            if let Some(a) = advisory {
                println!("  ! {}", a);
            }
            self.last_advisory = advisory;
        }
    }
}

fn status_line<D: TickDriver>(session: &Session<D, ConsoleAudio>, state: &TimerState) -> String {
    if state.phase() == Phase::Complete {
        return "✓ Workout complete!".to_string();
    }

    let label = session
        .schedule()
        .and_then(|s| s.interval_at(state.position()))
        .map(|i| i.label.as_str())
        .unwrap_or("");
    let set_count = session.schedule().map(|s| s.set_count()).unwrap_or(0);
    let paused = if state.paused { " [paused]" } else { "" };

    format!(
        "[set {}/{}] {:<24} {:>12}  phase {:>3.0}%  session {:>3.0}%{}",
        state.current_set_index + 1,
        set_count,
        label,
        session.format_remaining().unwrap_or_default(),
        session.phase_progress().unwrap_or(0.0),
        session.session_progress().unwrap_or(0.0),
        paused
    )
}
