//! Configuration management for catch-thread

use crate::error::{CatchThreadError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default location of the project config file
pub const DEFAULT_CONFIG_PATH: &str = ".catch-thread/config.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Threading settings
    pub thread: ThreadConfig,
    /// Export settings
    pub export: ExportConfig,
    /// Storage settings
    pub storage: StorageConfig,
}

impl Config {
    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CatchThreadError::FileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file, falling back to defaults when it is missing
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(CatchThreadError::FileNotFound(_)) => Ok(Self::default()),
            other => other,
        }
    }

    /// Write as TOML, creating the parent directory
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.export.indent_width == 0 || self.export.indent_width > 16 {
            return Err(CatchThreadError::Config(format!(
                "export.indent_width must be between 1 and 16, got {}",
                self.export.indent_width
            )));
        }
        if !crate::export::ExportManager::new().has_format(&self.export.default_format) {
            return Err(CatchThreadError::Config(format!(
                "Unknown export.default_format: {}",
                self.export.default_format
            )));
        }
        Ok(())
    }
}

/// Threading-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadConfig {
    /// Audit snapshots and log anomalies before threading
    pub warn_on_anomalies: bool,
    /// Sort input records by creation time before threading
    pub sort_input: bool,
}

impl Default for ThreadConfig {
    fn default() -> Self {
        Self {
            warn_on_anomalies: true,
            sort_input: false,
        }
    }
}

/// Export-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Default export format
    pub default_format: String,
    /// Spaces per nesting level in text output
    pub indent_width: usize,
    /// Include timestamps in text output
    pub show_timestamps: bool,
    /// Include thread statistics
    pub include_stats: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_format: "text".to_string(),
            indent_width: 2,
            show_timestamps: false,
            include_stats: true,
        }
    }
}

/// Storage-related configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Data directory for stored feeds, platform data dir when unset
    pub data_dir: Option<PathBuf>,
}
