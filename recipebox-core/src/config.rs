//! Client configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::error::ConfigError;

/// Default json-server address.
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default search debounce in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 250;

/// Recipe store client configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// Base URL of the server; the collection lives at `<api_url>/recipes`.
    pub api_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Quiet period before a search query is applied.
    pub debounce: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `RECIPEBOX_API_URL`: server base URL (default: "http://localhost:3000")
    /// - `RECIPEBOX_TIMEOUT_SECS`: request timeout (default: 30)
    /// - `RECIPEBOX_DEBOUNCE_MS`: search debounce (default: 250)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`StoreConfig::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("RECIPEBOX_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout_secs = parse_u64(&lookup, "RECIPEBOX_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let debounce_ms = parse_u64(&lookup, "RECIPEBOX_DEBOUNCE_MS", DEFAULT_DEBOUNCE_MS)?;

        Ok(Self {
            api_url,
            timeout: Duration::from_secs(timeout_secs),
            debounce: Duration::from_millis(debounce_ms),
        })
    }
}

fn parse_u64<F>(lookup: &F, name: &str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidEnvVar {
                name: name.to_string(),
                value,
            }),
    }
}
