//! Application configuration — YAML file under `~/.bytebeat/`.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audio::DEFAULT_RATE;
use crate::osc::OscConfig;

/// Errors reading or writing the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Settings for the `play` command. CLI flags take precedence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Expression clock in ticks per second.
    #[serde(default = "default_rate")]
    pub rate: u32,
    /// Master volume, 0.0 to 1.0.
    #[serde(default = "default_volume")]
    pub volume: f32,
    /// Expression to start with. `None` plays silence until one arrives.
    #[serde(default)]
    pub expression: Option<String>,
    #[serde(default)]
    pub osc: OscConfig,
}

fn default_rate() -> u32 {
    DEFAULT_RATE
}

fn default_volume() -> f32 {
    0.5
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rate: default_rate(),
            volume: default_volume(),
            expression: None,
            osc: OscConfig::default(),
        }
    }
}

/// Default path for the config file.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".bytebeat").join("config.yaml"))
}

impl AppConfig {
    /// Load from the default path, falling back to defaults when the file is
    /// missing or can't be read.
    pub fn load() -> Self {
        let Some(path) = default_config_path() else {
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), "{e}; using defaults");
                Self::default()
            }
        }
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Save to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }
}
