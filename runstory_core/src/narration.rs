//! Narration content lookup by schedule position.
//!
//! Story text and speech arrive from external collaborators as opaque
//! values. This module only decides which of them belongs to the interval
//! the timer is on.

use crate::{Narration, Position, Result, Schedule, Segmented};
use std::path::Path;

impl<T> Segmented<T> {
    /// Index of the entry used for `position`, or None for an empty list
    ///
    /// Lists shorter than the schedule reuse their last entry.
    pub fn segment_index(&self, position: Position, schedule: &Schedule) -> Option<usize> {
        let (wanted, len) = match self {
            Segmented::Single(_) => return Some(0),
            Segmented::PerSet(items) => (position.set_index, items.len()),
            Segmented::PerInterval(items) => (schedule.flat_index(position), items.len()),
        };
        len.checked_sub(1).map(|last| wanted.min(last))
    }

    /// Entry for `position`
    pub fn resolve(&self, position: Position, schedule: &Schedule) -> Option<&T> {
        let index = self.segment_index(position, schedule)?;
        match self {
            Segmented::Single(item) => Some(item),
            Segmented::PerSet(items) | Segmented::PerInterval(items) => items.get(index),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Segmented::Single(_) => false,
            Segmented::PerSet(items) | Segmented::PerInterval(items) => items.is_empty(),
        }
    }
}

impl Narration {
    /// Load a narration manifest (JSON) written by the story/speech pipeline
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let narration: Narration = serde_json::from_str(&contents)?;
        tracing::info!("Loaded narration from {:?}", path);
        Ok(narration)
    }

    /// Story text for the interval at `position`
    pub fn text_at(&self, position: Position, schedule: &Schedule) -> Option<&str> {
        self.text
            .as_ref()
            .and_then(|t| t.resolve(position, schedule))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::tests::two_set_schedule;
    use crate::{NarrationText, WorkoutSettings};

    #[test]
    fn test_single_ignores_position() {
        let schedule = two_set_schedule();
        let text = NarrationText::Single("once upon a time".into());
        assert_eq!(
            text.resolve(Position::new(1, 2), &schedule).map(String::as_str),
            Some("once upon a time")
        );
    }

    #[test]
    fn test_per_set_clamps_to_last() {
        let schedule = WorkoutSettings {
            sets: 3,
            ..WorkoutSettings::default()
        }
        .to_schedule()
        .unwrap();
        let text = NarrationText::PerSet(vec!["chapter 1".into(), "chapter 2".into()]);

        let at = |set| {
            text.resolve(Position::new(set, 0), &schedule)
                .map(String::as_str)
        };
        assert_eq!(at(0), Some("chapter 1"));
        assert_eq!(at(1), Some("chapter 2"));
        assert_eq!(at(2), Some("chapter 2"));
    }

    #[test]
    fn test_per_interval_uses_flattened_order() {
        let schedule = two_set_schedule();
        let text = NarrationText::PerInterval((0..4).map(|i| format!("part {}", i)).collect());

        assert_eq!(text.segment_index(Position::new(0, 1), &schedule), Some(1));
        assert_eq!(text.segment_index(Position::new(1, 1), &schedule), Some(3));
        // Flat index 4 is past the list
        assert_eq!(text.segment_index(Position::new(1, 2), &schedule), Some(3));
    }

    #[test]
    fn test_empty_list_resolves_nothing() {
        let schedule = two_set_schedule();
        let text: NarrationText = Segmented::PerSet(vec![]);
        assert!(text.is_empty());
        assert_eq!(text.resolve(Position::new(0, 0), &schedule), None);
    }

    #[test]
    fn test_load_manifest() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("narration.json");
        std::fs::write(
            &path,
            r#"{
                "text": {"mode": "per_set", "items": ["The gate opens.", "The road bends."]},
                "audio": {"mode": "single", "items": "story.mp3"}
            }"#,
        )
        .unwrap();

        let narration = Narration::load_from(&path).unwrap();
        let schedule = two_set_schedule();
        assert_eq!(
            narration.text_at(Position::new(1, 0), &schedule),
            Some("The road bends.")
        );
        assert!(matches!(narration.audio, Some(Segmented::Single(_))));
    }
}
