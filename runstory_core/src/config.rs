//! Configuration file support for runstory.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/runstory/config.toml`.

use crate::{AudioHandle, Error, Result, WorkoutSettings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub audio: AudioConfig,

    /// Uniform workout used when no preset is chosen
    #[serde(default)]
    pub workout: WorkoutSettings,
}

/// Narration playback configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Silent substitutions allowed per track before giving up
    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,

    #[serde(default = "default_silent_track")]
    pub silent_track: AudioHandle,

    #[serde(default)]
    pub start_muted: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            retry_limit: default_retry_limit(),
            silent_track: default_silent_track(),
            start_muted: false,
        }
    }
}

// Default value functions
fn default_retry_limit() -> u32 {
    3
}

fn default_silent_track() -> AudioHandle {
    AudioHandle::new("builtin:silence")
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|| PathBuf::from("."))
        });
        base.join("runstory").join("config.toml")
    }

    /// Reject values the rest of the system cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.audio.silent_track.as_str().trim().is_empty() {
            return Err(Error::Config("audio.silent_track must not be empty".into()));
        }
        self.workout.to_schedule().map_err(|e| {
            Error::Config(format!("workout settings do not form a schedule: {}", e))
        })?;
        Ok(())
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
