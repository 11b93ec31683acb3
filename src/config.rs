//! # Configuration Management Module
//!
//! Persistent application settings stored in platform-appropriate locations.
//! Handles loading, saving, and providing defaults for configuration options.
//!
//! ## Settings
//! - `data_dir`: where corpus recordings are looked up
//! - `export_dir`: where generated recordings and statistics are written
//! - `chunk_seconds`: default playback chunk duration
//! - `points_per_frame`: default animation speed
//!
//! ## Storage Location
//! - macOS: ~/Library/Application Support/arteria/config.toml
//! - Linux: ~/.config/arteria/config.toml
//! - Windows: %APPDATA%\arteria\config.toml
//!
//! ## Why TOML
//! Human-readable format allows manual editing if needed. Serde provides
//! automatic serialization/deserialization.

use crate::error::ConfigError;
use crate::playback::{DEFAULT_CHUNK_SECONDS, DEFAULT_POINTS_PER_FRAME};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data_dir: PathBuf,
    pub export_dir: PathBuf,
    pub chunk_seconds: u32,
    pub points_per_frame: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            export_dir: PathBuf::from("generated"),
            chunk_seconds: DEFAULT_CHUNK_SECONDS,
            points_per_frame: DEFAULT_POINTS_PER_FRAME,
        }
    }
}

impl Config {
    /// Get the path to the config file
    fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("arteria").join("config.toml")
    }

    /// Load config from file, or create default if it doesn't exist
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();

        match fs::read_to_string(&path) {
            Ok(contents) => {
                let config = toml::from_str(&contents).map_err(ConfigError::ParseFailed)?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // File doesn't exist, create default
                let config = Self::default();
                config.save()?;
                Ok(config)
            }
            Err(e) => Err(ConfigError::ReadFailed(e)),
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path();

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::WriteFailed)?;
        }

        let toml_string = toml::to_string_pretty(self).map_err(ConfigError::SerializeFailed)?;
        fs::write(&path, toml_string).map_err(ConfigError::WriteFailed)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.chunk_seconds, 5);
        assert_eq!(config.points_per_frame, 10);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config {
            data_dir: PathBuf::from("/corpus"),
            export_dir: PathBuf::from("/out"),
            chunk_seconds: 8,
            points_per_frame: 25,
        };

        let toml_str = toml::to_string(&config).expect("Failed to serialize");
        assert!(toml_str.contains("chunk_seconds = 8"));
        assert!(toml_str.contains("points_per_frame = 25"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            data_dir = "corpus"
            export_dir = "out"
            chunk_seconds = 3
            points_per_frame = 15
        "#;

        let config: Config = toml::from_str(toml_str).expect("Failed to deserialize");
        assert_eq!(config.data_dir, PathBuf::from("corpus"));
        assert_eq!(config.chunk_seconds, 3);
        assert_eq!(config.points_per_frame, 15);
    }
}
