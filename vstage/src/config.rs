//! Configuration management (config.toml)
//!
//! Settings are stored in TOML format in the platform-specific config
//! directory, or in a file passed explicitly on the command line.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use vstage_common::ClipW;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Headless rendering settings
    #[serde(default)]
    pub render: RenderConfig,
}

/// GPU adapter preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PowerPreference {
    None,
    #[default]
    LowPower,
    HighPerformance,
}

impl PowerPreference {
    pub fn to_wgpu(self) -> wgpu::PowerPreference {
        match self {
            PowerPreference::None => wgpu::PowerPreference::None,
            PowerPreference::LowPower => wgpu::PowerPreference::LowPower,
            PowerPreference::HighPerformance => wgpu::PowerPreference::HighPerformance,
        }
    }
}

/// Headless rendering configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Render target width in pixels (default: 64)
    #[serde(default = "default_extent")]
    pub width: u32,
    /// Render target height in pixels (default: 64)
    #[serde(default = "default_extent")]
    pub height: u32,
    /// Fourth clip-space component written by the stage (default: zero)
    #[serde(default)]
    pub clip_w: ClipW,
    /// Adapter power preference (default: low-power)
    #[serde(default)]
    pub power_preference: PowerPreference,
    /// Only accept a software adapter (default: false)
    #[serde(default)]
    pub force_fallback_adapter: bool,
}

fn default_extent() -> u32 {
    64
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: default_extent(),
            height: default_extent(),
            clip_w: ClipW::default(),
            power_preference: PowerPreference::default(),
            force_fallback_adapter: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Render target must be at least 1x1, got {width}x{height}")]
    EmptyTarget { width: u32, height: u32 },
}

impl Config {
    /// Reject settings no device can honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let RenderConfig { width, height, .. } = self.render;
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyTarget { width, height });
        }
        Ok(())
    }
}

/// Returns the platform-specific configuration directory.
///
/// On Linux: `~/.config/vstage`
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.vstage", "", "vstage")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Path of `config.toml` in the platform config directory.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Loads the configuration from the platform config directory.
///
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load() -> Config {
    match config_path() {
        Some(path) => load_or_default(&path),
        None => Config::default(),
    }
}

/// Loads `path`, falling back to defaults (with a warning) if it is missing
/// or invalid.
pub fn load_or_default(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }
    match load_from(path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Ignoring {}: {}", path.display(), e);
            Config::default()
        }
    }
}

/// Loads and validates the configuration from an explicit path.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Writes the configuration to an explicit path, creating parent directories.
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Saves the configuration to the platform config directory.
///
/// Returns the path written, or `None` if there is no config directory.
pub fn save(config: &Config) -> Result<Option<PathBuf>, ConfigError> {
    match config_path() {
        Some(path) => {
            save_to(config, &path)?;
            Ok(Some(path))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.render.width, 64);
        assert_eq!(config.render.height, 64);
        assert_eq!(config.render.clip_w, ClipW::Zero);
        assert_eq!(config.render.power_preference, PowerPreference::LowPower);
        assert!(!config.render.force_fallback_adapter);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_render_section() {
        let config: Config = toml::from_str(
            r#"
            [render]
            width = 128
            clip_w = "one"
            power_preference = "high-performance"
            "#,
        )
        .unwrap();
        assert_eq!(config.render.width, 128);
        assert_eq!(config.render.height, 64);
        assert_eq!(config.render.clip_w, ClipW::One);
        assert_eq!(
            config.render.power_preference,
            PowerPreference::HighPerformance
        );
    }

    #[test]
    fn test_invalid_clip_w_rejected() {
        let result: Result<Config, _> = toml::from_str("[render]\nclip_w = \"two\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.render.clip_w = ClipW::One;
        config.render.width = 32;
        save_to(&config, &path).unwrap();

        assert_eq!(load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_zero_extent_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[render]\nheight = 0\n").unwrap();

        assert!(matches!(
            load_from(&path),
            Err(ConfigError::EmptyTarget {
                width: 64,
                height: 0
            })
        ));
    }

    #[test]
    fn test_load_or_default_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[render\nwidth = ").unwrap();
        assert_eq!(load_or_default(&path), Config::default());
    }

    #[test]
    fn test_load_or_default_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[render]\nwidth = 0\nclip_w = \"one\"\n").unwrap();
        assert_eq!(load_or_default(&path), Config::default());
    }

    #[test]
    fn test_load_or_default_missing_and_valid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert_eq!(load_or_default(&path), Config::default());

        std::fs::write(&path, "[render]\nclip_w = \"one\"\n").unwrap();
        assert_eq!(load_or_default(&path).render.clip_w, ClipW::One);
    }

    #[test]
    fn test_config_path_file_name() {
        if let Some(path) = config_path() {
            assert!(path.ends_with("config.toml"));
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_from(&dir.path().join("absent.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
