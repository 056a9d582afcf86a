use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub listing: ListingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the library backend (no trailing slash needed)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds. Unset means requests may wait forever.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// File backing the durable client storage (token and session record)
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./.libradesk/storage.json")
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingConfig {
    /// Page size of the public catalog (explore) screen
    #[serde(default = "default_catalog_page_size")]
    pub catalog_page_size: usize,
    /// Page size of the admin and staff list screens
    #[serde(default = "default_admin_page_size")]
    pub admin_page_size: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            catalog_page_size: default_catalog_page_size(),
            admin_page_size: default_admin_page_size(),
        }
    }
}

fn default_catalog_page_size() -> usize {
    8
}

fn default_admin_page_size() -> usize {
    6
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::parse(&content)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).with_context(|| "Failed to parse configuration file")?;
        if config.listing.catalog_page_size == 0 || config.listing.admin_page_size == 0 {
            anyhow::bail!("Page sizes in [listing] must be at least 1");
        }
        Ok(config)
    }

    pub fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            storage: StorageConfig::default(),
            listing: ListingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
