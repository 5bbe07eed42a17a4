//! Built-in workout presets.
//!
//! This module provides the stock schedules offered when the user does not
//! configure their own.

use crate::{Error, Interval, Result, Schedule, WorkoutSet};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// A named, ready-to-run workout
#[derive(Clone, Debug)]
pub struct Preset {
    pub id: String,
    pub name: String,
    pub description: String,
    pub sets: Vec<WorkoutSet>,
}

impl Preset {
    /// Validated schedule for this preset
    pub fn schedule(&self) -> Result<Schedule> {
        Schedule::new(self.sets.clone())
    }
}

/// All presets, keyed by id
#[derive(Clone, Debug)]
pub struct Catalog {
    pub presets: BTreeMap<String, Preset>,
}

impl Catalog {
    pub fn get(&self, id: &str) -> Result<&Preset> {
        self.presets
            .get(id)
            .ok_or_else(|| Error::UnknownPreset(id.to_string()))
    }

    /// Problems with any preset; empty when the catalog is usable
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for (key, preset) in &self.presets {
            if key != &preset.id {
                errors.push(format!("preset key '{}' does not match id '{}'", key, preset.id));
            }
            if let Err(e) = preset.schedule() {
                errors.push(format!("preset '{}': {}", preset.id, e));
            }
        }
        errors
    }
}

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

fn bout(id: &str, label: &str, duration: u32, pause: u32) -> Interval {
    Interval {
        id: id.into(),
        label: label.into(),
        duration_seconds: duration,
        pause_after_seconds: pause,
    }
}

fn uniform_set(prefix: &str, label: &str, count: u32, duration: u32, pause: u32, rest: u32) -> WorkoutSet {
    WorkoutSet {
        intervals: (1..=count)
            .map(|n| bout(&format!("{}_{}", prefix, n), &format!("{} {}", label, n), duration, pause))
            .collect(),
        rest_after_seconds: rest,
    }
}

/// Builds the default catalog with the built-in presets
pub fn build_default_catalog() -> Catalog {
    let mut presets = BTreeMap::new();

    // Tabata: 2 blocks of 8 × (20s on, 10s off), 60s between blocks
    presets.insert(
        "tabata".into(),
        Preset {
            id: "tabata".into(),
            name: "Tabata (2 blocks)".into(),
            description: "Eight 20-second efforts with 10-second pauses, twice".into(),
            sets: (1..=2)
                .map(|b| uniform_set(&format!("tabata_b{}", b), "Effort", 8, 20, 10, 60))
                .collect(),
        },
    );

    // EMOM: 10 one-minute intervals, no pauses
    presets.insert(
        "emom_10m".into(),
        Preset {
            id: "emom_10m".into(),
            name: "10-Min EMOM".into(),
            description: "A new effort at the top of every minute for ten minutes".into(),
            sets: vec![uniform_set("emom", "Minute", 10, 60, 0, 0)],
        },
    );

    // Pyramid: 30/45/60/45/30 with pauses, as three sets
    presets.insert(
        "pyramid".into(),
        Preset {
            id: "pyramid".into(),
            name: "Pyramid".into(),
            description: "Efforts climb to a minute and back down, with rests between sets".into(),
            sets: vec![
                WorkoutSet {
                    intervals: vec![
                        bout("pyr_up_30", "Climb 30s", 30, 15),
                        bout("pyr_up_45", "Climb 45s", 45, 15),
                    ],
                    rest_after_seconds: 60,
                },
                WorkoutSet {
                    intervals: vec![bout("pyr_peak", "Summit 60s", 60, 0)],
                    rest_after_seconds: 60,
                },
                WorkoutSet {
                    intervals: vec![
                        bout("pyr_down_45", "Descend 45s", 45, 15),
                        bout("pyr_down_30", "Descend 30s", 30, 0),
                    ],
                    rest_after_seconds: 0,
                },
            ],
        },
    );

    // Short run used for demos and smoke tests
    presets.insert(
        "quick_demo".into(),
        Preset {
            id: "quick_demo".into(),
            name: "Quick Demo".into(),
            description: "Two tiny sets to see every phase in under half a minute".into(),
            sets: vec![
                WorkoutSet {
                    intervals: vec![bout("demo_1", "Warm-up", 5, 2), bout("demo_2", "Push", 4, 0)],
                    rest_after_seconds: 3,
                },
                WorkoutSet {
                    intervals: vec![bout("demo_3", "Finish", 5, 0)],
                    rest_after_seconds: 0,
                },
            ],
        },
    );

    Catalog { presets }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_is_valid() {
        let catalog = build_default_catalog();
        let errors = catalog.validate();
        assert!(errors.is_empty(), "catalog errors: {:?}", errors);
    }

    #[test]
    fn test_preset_totals() {
        let catalog = get_default_catalog();
        // 2 × 8 × 30 + 60
        assert_eq!(catalog.get("tabata").unwrap().schedule().unwrap().total_seconds(), 540);
        assert_eq!(catalog.get("emom_10m").unwrap().schedule().unwrap().total_seconds(), 600);
        assert_eq!(catalog.get("quick_demo").unwrap().schedule().unwrap().total_seconds(), 19);
    }

    #[test]
    fn test_unknown_preset() {
        let result = get_default_catalog().get("marathon");
        assert!(matches!(result, Err(Error::UnknownPreset(_))));
    }

    #[test]
    fn test_validate_reports_broken_preset() {
        let mut catalog = build_default_catalog();
        catalog.presets.insert(
            "broken".into(),
            Preset {
                id: "broken".into(),
                name: "Broken".into(),
                description: String::new(),
                sets: vec![],
            },
        );
        let errors = catalog.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("broken"));
    }
}
