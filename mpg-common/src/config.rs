//! Bootstrap configuration loading
//!
//! Resolution order for the record source base URL:
//! 1. Environment variable (`MPG_API_BASE_URL`)
//! 2. TOML config file (`api_base_url`)
//! 3. Compiled default (`http://localhost:5001`)
//!
//! A missing config file is not an error: a warning is logged and compiled
//! defaults are used. A file that exists but does not parse is reported as
//! [`Error::Config`].

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable overriding the record source base URL
pub const BASE_URL_ENV: &str = "MPG_API_BASE_URL";

/// Environment variable overriding the config file location
pub const CONFIG_FILE_ENV: &str = "MPG_CONFIG_FILE";

const DEFAULT_BASE_URL: &str = "http://localhost:5001";
const DEFAULT_ENDPOINT: &str = "top_players";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Color assignment strategy for plot series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScheme {
    /// Fresh uniformly random color on every projection
    #[default]
    Random,
    /// Color derived from a digest of the series label, stable across redraws
    LabelHash,
}

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    /// Record source base URL (scheme + host + port)
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Record source endpoint path below the base URL
    #[serde(default)]
    pub endpoint: Option<String>,

    /// HTTP request timeout in milliseconds
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,

    /// Series color strategy
    #[serde(default)]
    pub color_scheme: ColorScheme,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
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
    "info".to_string()
}

impl TomlConfig {
    /// Parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TomlConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from the resolved config location, falling back to defaults
    ///
    /// Only a missing file degrades to defaults. Unreadable or malformed files
    /// are errors, since silently ignoring them would hide a typo.
    pub fn load_or_default() -> Result<Self> {
        let Some(path) = config_file_path() else {
            warn!("Could not determine config directory, using compiled defaults");
            return Ok(Self::default());
        };

        if !path.exists() {
            warn!("Config file not found at {}, using compiled defaults", path.display());
            return Ok(Self::default());
        }

        info!("Loading config from {}", path.display());
        Self::load(&path)
    }
}

/// Config file location: `MPG_CONFIG_FILE`, else `<config_dir>/mpg-chart/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|d| d.join("mpg-chart").join("config.toml"))
}

/// Resolved settings for the HTTP record source
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL without trailing slash
    pub base_url: String,
    /// Endpoint path without leading slash
    pub endpoint: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl ClientConfig {
    /// Resolve client settings from environment, TOML and compiled defaults
    pub fn resolve(toml_config: &TomlConfig) -> Result<Self> {
        let base_url = match std::env::var(BASE_URL_ENV) {
            Ok(url) => {
                info!("Record source base URL from environment: {}", url);
                url
            }
            Err(_) => match &toml_config.api_base_url {
                Some(url) => url.clone(),
                None => DEFAULT_BASE_URL.to_string(),
            },
        };

        let endpoint = toml_config
            .endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let timeout_ms = toml_config.request_timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS);
        if timeout_ms == 0 {
            return Err(Error::Config("request_timeout_ms must be positive".to_string()));
        }

        Ok(Self {
            base_url: validate_base_url(&base_url)?,
            endpoint: endpoint.trim_matches('/').to_string(),
            timeout: Duration::from_millis(timeout_ms),
        })
    }

    /// Full URL of the record endpoint (query string excluded)
    pub fn endpoint_url(&self) -> String {
        format!("{}/{}", self.base_url, self.endpoint)
    }
}

fn validate_base_url(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(Error::Config(format!(
            "record source base URL must start with http:// or https://, got '{}'",
            url
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_base_url_trims_trailing_slash() {
        assert_eq!(
            validate_base_url("http://localhost:5001/").unwrap(),
            "http://localhost:5001"
        );
    }

    #[test]
    fn test_validate_base_url_rejects_missing_scheme() {
        let err = validate_base_url("localhost:5001").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_endpoint_url_joins_parts() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoint_url(), "http://localhost:5001/top_players");
    }

    #[test]
    fn test_logging_defaults_to_info() {
        let config: TomlConfig = toml::from_str("").unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.color_scheme, ColorScheme::Random);
    }
}
