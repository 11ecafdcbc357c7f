//! Configuration loading for commons-images-mcp
//!
//! Configuration is loaded from:
//! 1. Environment variables (`COMMONS_API_URL`, `COMMONS_BOT_NAME`,
//!    `COMMONS_BOT_VERSION`, `COMMONS_BOT_CONTACT`)
//! 2. Environment variable COMMONS_IMAGES_CONFIG_PATH
//! 3. ~/.binks/commons-images.toml
//! 4. Default values

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::error::ImagesResult;
use crate::request::{parse_endpoint, Identification, COMMONS_API_URL, DEFAULT_LIMIT};
use crate::search::FailurePolicy;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// How this client identifies itself to Commons
    #[serde(default)]
    pub identification: Identification,
    /// Search configuration
    #[serde(default)]
    pub search: SearchConfig,
    /// Bulk download configuration
    #[serde(default)]
    pub download: DownloadConfig,
}

/// Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// MediaWiki API endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Pages requested when a caller gives no limit
    #[serde(default = "default_limit")]
    pub default_limit: u32,
    /// Request timeout in seconds
    #[serde(default = "default_search_timeout")]
    pub timeout_seconds: u64,
    /// Degrade failures into an empty result instead of returning them
    #[serde(default = "default_true")]
    pub fail_soft: bool,
}

/// Bulk download configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Maximum number of files fetched at once
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Per-file timeout in seconds
    #[serde(default = "default_download_timeout")]
    pub timeout_seconds: u64,
}

// Default value functions
fn default_api_url() -> String {
    COMMONS_API_URL.to_string()
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

fn default_search_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_max_concurrent() -> usize {
    8
}

fn default_download_timeout() -> u64 {
    4
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            default_limit: default_limit(),
            timeout_seconds: default_search_timeout(),
            fail_soft: default_true(),
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            timeout_seconds: default_download_timeout(),
        }
    }
}

impl SearchConfig {
    pub fn endpoint(&self) -> ImagesResult<Url> {
        parse_endpoint(&self.api_url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        if self.fail_soft {
            FailurePolicy::Degrade
        } else {
            FailurePolicy::Propagate
        }
    }
}

impl DownloadConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Config {
    /// Load configuration from the default location or use defaults
    pub fn load() -> Result<Self> {
        Self::load_from(Self::find_config_path())
    }

    /// Load configuration from `path` (if it exists), then apply environment overrides
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let mut config = if let Some(path) = config_path {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                let content = std::fs::read_to_string(&path)?;
                Self::from_toml(&content)?
            } else {
                tracing::info!("Config file not found, using defaults");
                Self::default()
            }
        } else {
            tracing::info!("No config path specified, using defaults");
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());

        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply overrides from a key lookup (the environment, in practice)
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("COMMONS_API_URL") {
            self.search.api_url = url;
        }
        if let Some(name) = lookup("COMMONS_BOT_NAME") {
            self.identification.bot_name = name;
        }
        if let Some(version) = lookup("COMMONS_BOT_VERSION") {
            self.identification.version = version;
        }
        if let Some(contact) = lookup("COMMONS_BOT_CONTACT") {
            self.identification.contact = contact;
        }
    }

    /// Find the configuration file path
    fn find_config_path() -> Option<PathBuf> {
        // 1. Check environment variable
        if let Ok(path) = std::env::var("COMMONS_IMAGES_CONFIG_PATH") {
            return Some(PathBuf::from(path));
        }

        // 2. Check ~/.binks/commons-images.toml
        if let Ok(home) = std::env::var("HOME") {
            let path = PathBuf::from(home).join(".binks").join("commons-images.toml");
            return Some(path);
        }

        None
    }
}
