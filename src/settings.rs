//! Runtime settings.
//!
//! Settings are read from a JSON file in the platform config directory when
//! present. Command-line flags and environment variables override them.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::lookup::ValidationMode;

/// Directory searched for `<source>.json` when nothing else is configured
pub const DEFAULT_SOURCES_DIR: &str = "sources";

/// Persistent settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Settings file version for migration support
    #[serde(default = "default_version")]
    pub version: u32,
    /// Directory holding source configuration documents
    #[serde(default = "default_sources_dir")]
    pub sources_dir: PathBuf,
    /// Reject malformed or empty lookup entries instead of accepting them
    #[serde(default)]
    pub strict: bool,
}

fn default_version() -> u32 {
    1
}

fn default_sources_dir() -> PathBuf {
    PathBuf::from(DEFAULT_SOURCES_DIR)
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: 1,
            sources_dir: default_sources_dir(),
            strict: false,
        }
    }
}

impl Settings {
    /// Get the config directory path for aqfetch
    pub fn get_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("aqfetch"))
    }

    /// Get the path to the settings JSON file
    pub fn get_settings_path() -> Option<PathBuf> {
        Self::get_config_dir().map(|p| p.join("settings.json"))
    }

    /// Load settings from the default location, falling back to defaults
    pub fn load() -> Self {
        match Self::get_settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load settings from a specific file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!("No settings file at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => {
                    tracing::info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    tracing::error!("Failed to parse settings file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::error!("Failed to read settings file: {}", e);
                Self::default()
            }
        }
    }

    /// Apply command-line overrides. `strict` can only tighten validation.
    pub fn with_overrides(mut self, sources_dir: Option<PathBuf>, strict: bool) -> Self {
        if let Some(dir) = sources_dir {
            self.sources_dir = dir;
        }
        if strict {
            self.strict = true;
        }
        self
    }

    pub fn validation_mode(&self) -> ValidationMode {
        if self.strict {
            ValidationMode::Strict
        } else {
            ValidationMode::Permissive
        }
    }
}
