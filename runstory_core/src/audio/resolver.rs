//! Pick the concrete narration track for a timer position.

use crate::{AudioHandle, NarrationAudio, Position, Schedule};

/// Track for `position`: the single track, the per-set/per-interval entry
/// (clamped to the last one), or `placeholder` when nothing is available
pub fn resolve_audio(
    audio: Option<&NarrationAudio>,
    position: Position,
    schedule: &Schedule,
    placeholder: &AudioHandle,
) -> AudioHandle {
    audio
        .and_then(|a| a.resolve(position, schedule))
        .cloned()
        .unwrap_or_else(|| placeholder.clone())
}

/// Session narration paired with its silent fallback
#[derive(Clone, Debug)]
pub struct AudioResolver {
    narration: Option<NarrationAudio>,
    placeholder: AudioHandle,
}

impl AudioResolver {
    pub fn new(narration: Option<NarrationAudio>, placeholder: AudioHandle) -> Self {
        Self {
            narration,
            placeholder,
        }
    }

    pub fn resolve(&self, position: Position, schedule: &Schedule) -> AudioHandle {
        resolve_audio(
            self.narration.as_ref(),
            position,
            schedule,
            &self.placeholder,
        )
    }

    /// Known-good silent track used in place of failing narration
    pub fn placeholder(&self) -> &AudioHandle {
        &self.placeholder
    }
}
