//! Configuration module for framegraph
//!
//! Engine configuration is a single TOML file with one table per concern:
//!
//! ```toml
//! [pipeline]
//! frame_rate_hz = 60
//! fault_policy = "isolate_entry"
//!
//! [logging]
//! filter = "info,framegraph=trace"
//! directory = "/var/log/framegraph"
//! ```
//!
//! Missing tables and fields fall back to their defaults.
//!
//! # Config Location
//!
//! The default file lives in the platform-appropriate config directory:
//! - **Linux**: `~/.config/dev.framegraph/config.toml`
//! - **macOS**: `~/Library/Application Support/dev.framegraph/config.toml`
//! - **Windows**: `%APPDATA%\dev.framegraph\config.toml`

pub mod settings;

pub use settings::*;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for config directories
pub const APP_ID: &str = "dev.framegraph";

/// Config filename
pub const CONFIG_FILE: &str = "config.toml";

/// Config directory path, if the platform has one.
pub fn config_dir() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID))
}

/// Path to the default config file.
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join(CONFIG_FILE))
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub pipeline: PipelineSettings,
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Parse a TOML document.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Serialization(format!("Failed to serialize config: {}", e)))
    }

    /// Load a config file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        Self::from_toml(&content)
    }

    /// Load from the default location, returning defaults if the file is
    /// missing or unreadable.
    pub fn load_or_default() -> Self {
        match default_config_path() {
            Some(path) if path.exists() => Self::load(&path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config, using defaults: {}", e);
                Self::default()
            }),
            _ => Self::default(),
        }
    }

    /// Save as TOML, creating parent directories as needed
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file {:?}: {}", path, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = EngineConfig::from_toml(
            r#"
            [pipeline]
            frame_rate_hz = 120
            "#,
        )
        .unwrap();
        assert_eq!(config.pipeline.frame_rate_hz, 120);
        assert_eq!(config.pipeline.fault_policy, FaultPolicy::AbortFrame);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(EngineConfig::from_toml("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let err = EngineConfig::from_toml("[pipeline]\nframe_rate_hz = \"fast\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_default_path_uses_app_id() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with(Path::new(APP_ID).join(CONFIG_FILE)));
        }
    }
}
