//! Configuration management for hotfolder
//!
//! This module loads and validates the settings file that names the base
//! source directory, the destination directory, and the watcher tunables.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{HotfolderError, Result};

/// Settings loaded once at startup, immutable for the process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory containing the selectable XX-XX subfolders
    pub base_source_dir: PathBuf,
    /// Directory that changed files are copied into
    pub destination_dir: PathBuf,
    /// File watcher tunables
    #[serde(default)]
    pub watcher: WatcherSettings,
}

/// Tunables for event debouncing and partial-write detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherSettings {
    /// Debounce window for duplicate events on the same path, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Delay before re-checking that a changed file stopped growing, in milliseconds
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

fn default_debounce_ms() -> u64 {
    100
}

fn default_settle_ms() -> u64 {
    250
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            settle_ms: default_settle_ms(),
        }
    }
}

impl WatcherSettings {
    /// Get debounce window duration
    pub fn debounce_duration(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Get settle delay duration
    pub fn settle_duration(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

impl Settings {
    /// Load settings from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let raw = fs::read_to_string(path).map_err(|source| HotfolderError::SettingsRead {
            path: path.to_path_buf(),
            source,
        })?;

        let settings = serde_json::from_str(&raw).map_err(|source| HotfolderError::SettingsParse {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(settings)
    }

    /// Validate that the base source directory exists. The destination is
    /// deliberately not checked here: its absence is a per-copy condition,
    /// not a startup failure.
    pub fn validate(&self) -> Result<()> {
        if !self.base_source_dir.is_dir() {
            return Err(HotfolderError::InvalidPath(self.base_source_dir.clone()));
        }

        Ok(())
    }
}
