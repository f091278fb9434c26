//! TOML-based application configuration.
//!
//! Stores collaborator endpoint settings, the server listen address, and
//! session tuning. Configuration is stored at `~/.config/lockin/config.toml`;
//! a missing file loads as defaults. `LOCKIN_API_KEY` overrides the file key
//! so the credential never has to live on disk.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::llm;

/// Chat-completion collaborator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Bearer key; the `LOCKIN_API_KEY` environment variable takes priority.
    #[serde(default)]
    pub api_key: Option<String>,
}

/// HTTP API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
}

/// Session tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Seconds between countable violations.
    #[serde(default = "default_debounce_secs")]
    pub debounce_secs: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/lockin/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub session: SessionSettings,
}

// Default functions
fn default_base_url() -> String {
    llm::DEFAULT_BASE_URL.to_string()
}
fn default_model() -> String {
    llm::DEFAULT_MODEL.to_string()
}
fn default_timeout_secs() -> u64 {
    llm::DEFAULT_TIMEOUT_SECS
}
fn default_listen() -> String {
    "127.0.0.1:8642".to_string()
}
fn default_debounce_secs() -> u64 {
    2
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            api_key: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            debounce_secs: default_debounce_secs(),
        }
    }
}

impl LlmConfig {
    /// Resolved bearer key: environment first, then the config file.
    pub fn api_key(&self) -> Option<String> {
        std::env::var("LOCKIN_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .or_else(|| self.api_key.clone())
    }
}

impl SessionSettings {
    pub fn debounce_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.debounce_secs as i64)
    }
}

/// Returns `~/.config/lockin[-dev]/` based on LOCKIN_ENV.
///
/// Set LOCKIN_ENV=dev to use a development config directory.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .ok_or(ConfigError::NoConfigDir)?
        .join(".config");

    let env = std::env::var("LOCKIN_ENV").unwrap_or_else(|_| "production".to_string());
    let dir = if env == "dev" {
        base_dir.join("lockin-dev")
    } else {
        base_dir.join("lockin")
    };
    Ok(dir)
}

impl Config {
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(config_dir()?.join("config.toml"))
    }

    /// Load configuration, falling back to defaults when no file exists.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| ConfigError::LoadFailed {
            path,
            message: e.to_string(),
        })
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::SaveFailed {
                path: path.clone(),
                message: e.to_string(),
            })?;
        }
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, raw).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }
}
