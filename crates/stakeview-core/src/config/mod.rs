//! Application configuration with layered loading.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//!
//! 1. **Compiled defaults**: the `Default` implementations below
//! 2. **Config file**: TOML file named by the `STAKEVIEW_CONFIG` env var
//!    (default `config/config.toml`, optional)
//! 3. **Environment variables**: `STAKEVIEW__SECTION__FIELD` overrides one field
//!
//! # Configuration Sections
//!
//! - [`GatewayConfig`]: chain gateway and account API endpoints, router contract
//! - [`CacheStoreConfig`]: cache maintenance intervals and entry cap
//! - [`LoggingConfig`]: log level and format
//!
//! # Example
//!
//! ```toml
//! [gateway]
//! proxy_url = "https://gateway.multiversx.com"
//! api_url = "https://api.multiversx.com"
//! router_address = "erd1qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqq6gq4hu"
//!
//! [cache]
//! sweep_interval_seconds = 30
//! ```

use crate::{
    cache::CacheStoreConfig,
    chain::{Address, HttpClientConfig},
};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

/// Chain gateway and account API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway base URL serving `/vm-values/query`.
    #[serde(default = "default_proxy_url")]
    pub proxy_url: String,

    /// REST API base URL for account and token metadata.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Bech32 address of the staking router contract. Required.
    #[serde(default)]
    pub router_address: String,

    /// Whole-request timeout in seconds. Defaults to `30`.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Maximum concurrent requests per client. Defaults to `64`.
    #[serde(default = "default_concurrent_limit")]
    pub concurrent_limit: usize,
}

fn default_proxy_url() -> String {
    "https://gateway.multiversx.com".to_string()
}

fn default_api_url() -> String {
    "https://api.multiversx.com".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_concurrent_limit() -> usize {
    64
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            proxy_url: default_proxy_url(),
            api_url: default_api_url(),
            router_address: String::new(),
            timeout_seconds: default_timeout_seconds(),
            concurrent_limit: default_concurrent_limit(),
        }
    }
}

impl GatewayConfig {
    #[must_use]
    pub fn http_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            concurrent_limit: self.concurrent_limit,
            request_timeout: Duration::from_secs(self.timeout_seconds),
            ..HttpClientConfig::default()
        }
    }

    /// Parses the configured router address.
    ///
    /// # Errors
    ///
    /// Returns a descriptive error if the address is empty or not valid bech32.
    pub fn router(&self) -> Result<Address, String> {
        if self.router_address.is_empty() {
            return Err("gateway.router_address must be set".to_string());
        }
        Address::from_bech32(&self.router_address)
            .map_err(|e| format!("Invalid router address {}: {e}", self.router_address))
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`. Defaults to `info`.
    pub level: String,
    /// `json` or `pretty`. Defaults to `pretty`.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_environment")]
    pub environment: String,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub cache: CacheStoreConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_environment() -> String {
    "development".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            gateway: GatewayConfig::default(),
            cache: CacheStoreConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file with environment variable overrides.
    ///
    /// Use `__` as a separator for nested fields, e.g.
    /// `STAKEVIEW__GATEWAY__ROUTER_ADDRESS=erd1...`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be parsed or deserialized.
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let cache = CacheStoreConfig::default();
        let config_builder = Config::builder()
            .set_default("environment", default_environment())?
            .set_default("gateway.proxy_url", default_proxy_url())?
            .set_default("gateway.api_url", default_api_url())?
            .set_default("gateway.router_address", "")?
            .set_default("gateway.timeout_seconds", default_timeout_seconds())?
            .set_default("gateway.concurrent_limit", default_concurrent_limit() as u64)?
            .set_default("cache.sweep_interval_seconds", cache.sweep_interval_seconds)?
            .set_default("cache.stale_inflight_seconds", cache.stale_inflight_seconds)?
            .set_default("cache.max_entries", cache.max_entries as u64)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name(&config_path.as_ref().to_string_lossy()).required(false))
            .add_source(Environment::with_prefix("STAKEVIEW").separator("__"))
            .build()?;

        config_builder.try_deserialize()
    }

    /// Loads configuration from `config/config.toml`, or the file named by
    /// `STAKEVIEW_CONFIG`, with environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration cannot be loaded or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("STAKEVIEW_CONFIG").unwrap_or_else(|_| "config/config.toml".to_string());
        Self::from_file(&config_path)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a descriptive error string if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        let urls = [("proxy_url", &self.gateway.proxy_url), ("api_url", &self.gateway.api_url)];
        for (name, url) in urls {
            if url.is_empty() {
                return Err(format!("gateway.{name} must be set"));
            }
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(format!("Invalid gateway.{name}: {url}"));
            }
        }

        self.gateway.router()?;

        if self.gateway.timeout_seconds == 0 {
            return Err("Gateway timeout must be greater than 0".to_string());
        }

        if self.gateway.concurrent_limit == 0 {
            return Err("Gateway concurrent limit must be greater than 0".to_string());
        }

        if self.cache.sweep_interval_seconds == 0 {
            return Err("Cache sweep interval must be greater than 0".to_string());
        }

        if self.cache.stale_inflight_seconds == 0 {
            return Err("Cache stale inflight timeout must be greater than 0".to_string());
        }

        if self.cache.max_entries == 0 {
            return Err("Cache max entries must be greater than 0".to_string());
        }

        if !["json", "pretty"].contains(&self.logging.format.as_str()) {
            return Err("Logging format must be 'json' or 'pretty'".to_string());
        }

        Ok(())
    }
}
