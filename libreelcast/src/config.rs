//! Configuration management for Reelcast
//!
//! Structural settings live in a TOML file resolved through the XDG base
//! directories. Credentials are never stored here; they come from the
//! environment (see the `ENV_*` constants).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Environment variable holding the text-generation API key
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
/// Optional override for the text-generation API base URL
pub const ENV_OPENAI_BASE_URL: &str = "REELCAST_OPENAI_BASE_URL";
/// Instagram Graph API access token
pub const ENV_INSTAGRAM_ACCESS_TOKEN: &str = "INSTAGRAM_ACCESS_TOKEN";
/// Instagram Graph API user id
pub const ENV_INSTAGRAM_USER_ID: &str = "INSTAGRAM_USER_ID";
/// TikTok content posting access token
pub const ENV_TIKTOK_ACCESS_TOKEN: &str = "TIKTOK_ACCESS_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    pub instagram: Option<InstagramConfig>,
    pub tiktok: Option<TiktokConfig>,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub scheduling: SchedulingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "~/.local/share/reelcast/queue.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Chat model used for both generation steps
    pub model: String,
    /// Sampling temperature for the script step
    pub script_temperature: f32,
    /// Sampling temperature for the caption/hashtag step
    pub annotation_temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4".to_string(),
            script_temperature: 0.8,
            annotation_temperature: 0.7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstagramConfig {
    pub enabled: bool,
    #[serde(default = "default_instagram_api_base")]
    pub api_base: String,
}

fn default_instagram_api_base() -> String {
    "https://graph.instagram.com/v18.0".to_string()
}

impl Default for InstagramConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_base: default_instagram_api_base(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TiktokConfig {
    pub enabled: bool,
    #[serde(default = "default_tiktok_api_base")]
    pub api_base: String,
}

fn default_tiktok_api_base() -> String {
    "https://open-api.tiktok.com".to_string()
}

impl Default for TiktokConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_base: default_tiktok_api_base(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Platforms targeted when a request does not name any
    pub platforms: Vec<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            platforms: vec![
                crate::types::PLATFORM_INSTAGRAM.to_string(),
                crate::types::PLATFORM_TIKTOK.to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulingConfig {
    /// Seconds between daemon polls for due posts
    pub poll_interval: u64,
    /// Hour of day (UTC) that auto-scheduled slots anchor to
    pub anchor_hour: u32,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            poll_interval: 60,
            anchor_hour: 10,
        }
    }
}

impl Config {
    /// Load configuration from the default location
    ///
    /// Falls back to the built-in defaults when no config file exists yet.
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        if !config_path.exists() {
            return Ok(Self::default_config());
        }
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self {
            database: DatabaseConfig::default(),
            generation: GenerationConfig::default(),
            instagram: Some(InstagramConfig::default()),
            tiktok: Some(TiktokConfig::default()),
            defaults: DefaultsConfig::default(),
            scheduling: SchedulingConfig::default(),
        }
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("REELCAST_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("reelcast").join("config.toml"))
}

/// Resolve the data directory path following XDG Base Directory spec
pub fn resolve_data_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| ConfigError::MissingField("data directory".to_string()))?;

    Ok(data_dir.join("reelcast"))
}
