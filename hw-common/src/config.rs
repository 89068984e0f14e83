//! Configuration loading
//!
//! Settings come from a small TOML file. Every field has a built-in
//! default, and a missing config file is not an error: the dashboard logs
//! a warning and starts with defaults.
//!
//! Priority for the API base URL (highest first):
//! 1. Command-line argument
//! 2. `HAPPYWORLD_API_BASE_URL` environment variable
//! 3. TOML config file
//! 4. Compiled default (`http://localhost:8000/api`)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Compiled default for the KPI API root
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

/// Environment variable overriding the API base URL
pub const API_BASE_URL_ENV: &str = "HAPPYWORLD_API_BASE_URL";

/// Default dashboard service port
pub const DEFAULT_PORT: u16 = 5780;

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Complete dashboard configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// KPI API client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API root; resource paths such as `/kpis/summary` are appended
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Upper bound on a single fetch before the resource is marked unavailable
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// HTTP server settings for `hw-dash serve`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` wins when set
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_bind_addr() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Join a resource path onto the base URL
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "api.base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("api.timeout_secs must be greater than 0".to_string()));
        }
        Ok(())
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Explicit config file; must exist when given
    pub config_path: Option<PathBuf>,
    pub api_base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub port: Option<u16>,
}

impl DashboardConfig {
    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Resolve the effective configuration
    ///
    /// An explicitly requested file that cannot be read is an error; a
    /// missing file at the default location only produces a warning.
    pub fn load(overrides: &ConfigOverrides) -> Result<Self> {
        let mut config = match &overrides.config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                info!("Loading config from {}", path.display());
                Self::from_file(path)?
            }
            None => match default_config_path() {
                Some(path) if path.exists() => {
                    info!("Loading config from {}", path.display());
                    Self::from_file(&path)?
                }
                Some(path) => {
                    warn!(
                        "No config file at {}, using built-in defaults",
                        path.display()
                    );
                    Self::default()
                }
                None => {
                    warn!("Could not determine config directory, using built-in defaults");
                    Self::default()
                }
            },
        };

        config.api.base_url = resolve_api_base_url(
            overrides.api_base_url.as_deref(),
            &config.api.base_url,
        );
        if let Some(timeout) = overrides.timeout_secs {
            config.api.timeout_secs = timeout;
        }
        if let Some(port) = overrides.port {
            config.server.port = port;
        }

        config.api.validate()?;
        Ok(config)
    }
}

/// Pick the API base URL: CLI argument, then environment, then config file
pub fn resolve_api_base_url(cli_arg: Option<&str>, from_file: &str) -> String {
    if let Some(url) = cli_arg {
        return url.to_string();
    }

    if let Ok(url) = std::env::var(API_BASE_URL_ENV) {
        if !url.trim().is_empty() {
            return url;
        }
    }

    from_file.to_string()
}

/// Platform config file location (`<config dir>/happyworld/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("happyworld").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let api = ApiConfig {
            base_url: "http://example.test/api/".to_string(),
            ..Default::default()
        };
        assert_eq!(api.endpoint("/kpis/summary"), "http://example.test/api/kpis/summary");
        assert_eq!(api.endpoint("kpis/map-data"), "http://example.test/api/kpis/map-data");
    }

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.api.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.api.timeout(), Duration::from_secs(10));
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let api = ApiConfig {
            base_url: "localhost:8000".to_string(),
            ..Default::default()
        };
        assert!(matches!(api.validate(), Err(Error::Config(_))));

        let api = ApiConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(matches!(api.validate(), Err(Error::Config(_))));
    }
}
