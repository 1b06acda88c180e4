// src/config.rs
//
// Configuration is a single TOML file. The quote API key can also come from
// `PORTFOLIO_API_KEY`.

use crate::market::default_watchlist;
use crate::models::WatchlistEntry;
use crate::storage::DEFAULT_STORAGE_KEY;
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_PATH_ENV: &str = "PORTFOLIO_CONFIG";
pub const API_KEY_ENV: &str = "PORTFOLIO_API_KEY";
pub const DEFAULT_CONFIG_PATH: &str = "config/portfolio.toml";

/// Values shipped in example configs that must be replaced before startup.
const PLACEHOLDERS: &[&str] = &[
    "your_api_key",
    "your-api-key",
    "your_base_url",
    "changeme",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("`{field}` is still set to a placeholder; set a real value before starting")]
    Placeholder { field: String },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub quotes: QuotesConfig,
    #[serde(default)]
    pub market: MarketConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3030,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub path: PathBuf,
    #[serde(default = "default_storage_key")]
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            path: PathBuf::from("portfolio.json"),
            key: default_storage_key(),
        }
    }
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteProvider {
    Finnhub,
    AlphaVantage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuotesConfig {
    pub provider: QuoteProvider,
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_watchlist")]
    pub watchlist: Vec<WatchlistEntry>,
}

impl Default for MarketConfig {
    fn default() -> Self {
        MarketConfig {
            refresh_interval_secs: default_refresh_interval_secs(),
            watchlist: default_watchlist(),
        }
    }
}

impl MarketConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

fn default_refresh_interval_secs() -> u64 {
    300
}

/// Parses and validates a config file. `api_key_override` replaces
/// `quotes.api_key` when present.
pub fn load_config_from(
    path: &Path,
    api_key_override: Option<String>,
) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    let mut config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    if let Some(key) = api_key_override.filter(|k| !k.trim().is_empty()) {
        config.quotes.api_key = key;
    }
    validate(&config)?;
    Ok(config)
}

/// Loads the config named by `PORTFOLIO_CONFIG`, falling back to
/// `config/portfolio.toml` in the working directory.
pub fn load_config() -> Result<Config, ConfigError> {
    let path = std::env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    load_config_from(&path, std::env::var(API_KEY_ENV).ok())
}

fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    value.is_empty()
        || PLACEHOLDERS
            .iter()
            .any(|p| value.eq_ignore_ascii_case(p))
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if is_placeholder(&config.quotes.api_key) {
        return Err(ConfigError::Placeholder {
            field: "quotes.api_key".into(),
        });
    }
    if is_placeholder(&config.quotes.base_url) {
        return Err(ConfigError::Placeholder {
            field: "quotes.base_url".into(),
        });
    }
    if config.market.refresh_interval_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "market.refresh_interval_secs".into(),
            message: "must be greater than 0".into(),
        });
    }
    if config.storage.key.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "storage.key".into(),
            message: "must not be empty".into(),
        });
    }
    Ok(())
}
