//! Configuration module for the IMU recorder
//!
//! This module handles application configuration including:
//! - Where exports are written
//! - Recording settings (sampling rate, live display throttling)
//! - The synthetic sensor source used by the headless shell
//!
//! # Config Location
//!
//! The config file is stored in the platform-appropriate config directory
//! under `dev.hxyulin.imu-recorder`:
//!
//! - **Linux**: `~/.config/dev.hxyulin.imu-recorder/config.toml`
//! - **macOS**: `~/Library/Application Support/dev.hxyulin.imu-recorder/config.toml`
//! - **Windows**: `%APPDATA%\dev.hxyulin.imu-recorder\config.toml`
//!
//! Every field has a default, so a partial file is fine:
//!
//! ```toml
//! [export]
//! root_dir = "/sdcard"
//!
//! [recording]
//! sampling_rate = "game"
//! display_interval = 50
//! ```

pub mod settings;

pub use settings::*;

use crate::error::{ImuError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for config directories
pub const APP_ID: &str = "dev.hxyulin.imu-recorder";

/// Config filename
pub const CONFIG_FILE: &str = "config.toml";

/// Default name of the directory exports are placed in
pub const DEFAULT_EXPORT_DIR_NAME: &str = "IMUData";

// ==================== Config Directory ====================

/// Get the application config directory path
pub fn app_config_dir() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID))
}

/// Get the path to the default config file
pub fn default_config_path() -> Option<PathBuf> {
    app_config_dir().map(|p| p.join(CONFIG_FILE))
}

/// Default parent of the export directory: documents, else home, else the working directory
pub fn default_export_root() -> PathBuf {
    dirs_next::document_dir()
        .or_else(dirs_next::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

// ==================== Export Config ====================

/// Where session exports are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Parent directory; `None` uses [`default_export_root`]
    #[serde(default)]
    pub root_dir: Option<PathBuf>,

    /// Name of the export directory under the root
    #[serde(default = "default_export_dir_name")]
    pub dir_name: String,
}

fn default_export_dir_name() -> String {
    DEFAULT_EXPORT_DIR_NAME.to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            root_dir: None,
            dir_name: default_export_dir_name(),
        }
    }
}

impl ExportConfig {
    /// Full export directory
    pub fn export_dir(&self) -> PathBuf {
        self.root_dir
            .clone()
            .unwrap_or_else(default_export_root)
            .join(&self.dir_name)
    }
}

// ==================== App Config ====================

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Export location
    #[serde(default)]
    pub export: ExportConfig,

    /// Recording settings
    #[serde(default)]
    pub recording: RecordingSettings,

    /// Synthetic sensor source
    #[serde(default)]
    pub mock: MockSourceConfig,
}

impl AppConfig {
    /// Parse a config from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| ImuError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Render the config as TOML text
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ImuError::Serialization(format!("Failed to serialize config: {}", e)))
    }

    /// Load a config file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ImuError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        Self::from_toml(&content)
    }

    /// Load a config file, returning defaults if it is missing or invalid
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No config at {:?}, using defaults", path);
            return Self::default();
        }

        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Load from the default location, or defaults if there is none
    pub fn load_default_location() -> Self {
        match default_config_path() {
            Some(path) => Self::load_or_default(path),
            None => {
                tracing::warn!("Could not determine config directory, using defaults");
                Self::default()
            }
        }
    }

    /// Save the config file to disk
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ImuError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| {
            ImuError::Config(format!("Failed to write config file {:?}: {}", path, e))
        })
    }

    /// Full export directory
    pub fn export_dir(&self) -> PathBuf {
        self.export.export_dir()
    }
}
