//! Configuration management for Six Cities

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

pub const DEFAULT_BASE_URL: &str = "https://14.design.htmlacademy.pro/six-cities";
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// File name of the persisted bearer token
pub const TOKEN_KEY: &str = "six-cities-token";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Token file location; defaults to `<data_dir>/six-cities/six-cities-token`
    pub token_path: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Config {
    /// Load configuration from the default location
    ///
    /// A missing file is not an error: the defaults are used instead.
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        if !config_path.exists() {
            tracing::debug!("No config file at {:?}, using defaults", config_path);
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        if config.api.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField("api.base_url".to_string()).into());
        }
        Ok(config)
    }

    /// Resolve the token file path, expanding `~`
    pub fn token_path(&self) -> Result<PathBuf> {
        match self.storage.token_path {
            Some(ref path) => Ok(PathBuf::from(shellexpand::tilde(path).to_string())),
            None => Ok(resolve_data_path()?.join(TOKEN_KEY)),
        }
    }
}

/// Resolve the configuration file path using XDG base directories
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("SIX_CITIES_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("six-cities").join("config.toml"))
}

/// Resolve the data directory path using XDG base directories
pub fn resolve_data_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| ConfigError::MissingField("data directory".to_string()))?;

    Ok(data_dir.join("six-cities"))
}
