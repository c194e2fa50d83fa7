//! Engine settings.
//!
//! Loaded from a TOML file; every key is optional and falls back to the
//! defaults below.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// ROOT SETTINGS
// =============================================================================

/// Engine settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Table engine settings.
    pub table: TableSettings,

    /// Form engine settings.
    pub form: FormSettings,
}

impl Settings {
    /// Parse settings from TOML text.
    pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
        toml::from_str(source).map_err(SettingsError::Parse)
    }

    /// Load settings from `path`.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Save settings to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let write_error = |source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        let content = toml::to_string_pretty(self).map_err(SettingsError::Serialize)?;
        std::fs::write(path, content).map_err(write_error)
    }
}

// =============================================================================
// SECTIONS
// =============================================================================

/// Table engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSettings {
    /// Page size a new table starts with.
    pub default_limit: u32,
    /// Page sizes offered to the user.
    pub page_sizes: Vec<u32>,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            default_limit: 10,
            page_sizes: vec![10, 20, 50, 100],
        }
    }
}

/// Form engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSettings {
    /// Validate a field every time its value is set.
    pub validate_on_change: bool,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            validate_on_change: true,
        }
    }
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings from {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write settings to {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[source] toml::ser::Error),
}
