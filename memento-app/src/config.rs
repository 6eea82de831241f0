//! Application configuration.
//!
//! Configuration is loaded in the following order (later overrides
//! earlier):
//! 1. Default values
//! 2. YAML config file (if specified via MEMENTO_CONFIG or --config)
//! 3. Environment variables

use memento_input::ButtonConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Button timing configuration.
    pub input: InputConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Menu behavior configuration.
    pub ui: UiConfig,
}

impl Config {
    /// Loads configuration from file, then applies environment variable
    /// overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("MEMENTO_CONFIG") {
            config = Self::from_file(&path)?;
        }

        config.apply_env_overrides();
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config: Config = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(config)
    }

    /// Loads configuration from environment variables only.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        self.input.apply_env_overrides();
        self.storage.apply_env_overrides();
        self.ui.apply_env_overrides();
    }
}

/// Button timing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Debounce window in milliseconds.
    pub debounce_ms: u64,
    /// Short/long press threshold in milliseconds.
    pub long_press_ms: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 50,
            long_press_ms: 1500,
        }
    }
}

impl InputConfig {
    fn apply_env_overrides(&mut self) {
        if let Ok(ms) = std::env::var("MEMENTO_DEBOUNCE_MS") {
            if let Ok(v) = ms.parse() {
                self.debounce_ms = v;
            }
        }

        if let Ok(ms) = std::env::var("MEMENTO_LONG_PRESS_MS") {
            if let Ok(v) = ms.parse() {
                self.long_press_ms = v;
            }
        }
    }

    /// Returns the timings as a button configuration.
    pub fn button_config(&self) -> ButtonConfig {
        ButtonConfig {
            debounce: Duration::from_millis(self.debounce_ms),
            long_press: Duration::from_millis(self.long_press_ms),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Data directory.
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
        }
    }
}

impl StorageConfig {
    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("MEMENTO_DATA") {
            self.data_dir = PathBuf::from(dir);
        }
    }

    /// Returns the settings record path.
    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join("settings.json")
    }
}

/// Menu behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Seconds counted down before a factory reset executes.
    pub reset_countdown_secs: u32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            reset_countdown_secs: 3,
        }
    }
}

impl UiConfig {
    fn apply_env_overrides(&mut self) {
        if let Ok(secs) = std::env::var("MEMENTO_RESET_COUNTDOWN") {
            if let Ok(v) = secs.parse() {
                self.reset_countdown_secs = v;
            }
        }
    }
}

/// Configuration error.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {reason}")]
    Io { path: PathBuf, reason: String },

    #[error("failed to parse config file '{path}': {reason}")]
    Parse { path: PathBuf, reason: String },
}
