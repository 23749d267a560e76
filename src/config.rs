//! Configuration Module
//!
//! Handles loading client configuration from environment variables.

use std::env;
use std::time::Duration;

/// Client configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL resource paths are resolved against
    pub base_url: String,
    /// Cache TTL in seconds; `Some(0)` disables caching, `None` never expires
    pub cache_duration: Option<u64>,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Per-request timeout in seconds
    pub request_timeout: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `BASE_URL` - Base URL of the REST API (default: http://localhost:3000)
    /// - `CACHE_DURATION` - TTL in seconds, or `none` to never expire (default: 60)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 30)
    /// - `REQUEST_TIMEOUT` - Request timeout in seconds (default: 10)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            base_url: env::var("BASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.base_url),
            cache_duration: env::var("CACHE_DURATION")
                .ok()
                .and_then(|v| parse_cache_duration(&v))
                .unwrap_or(defaults.cache_duration),
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cleanup_interval),
            request_timeout: env::var("REQUEST_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

/// Parses a `CACHE_DURATION` value.
///
/// Returns `Some(None)` for "never expires", `Some(Some(secs))` for a number,
/// and `None` when the value is not understood.
fn parse_cache_duration(value: &str) -> Option<Option<u64>> {
    match value.trim().to_ascii_lowercase().as_str() {
        "none" | "never" => Some(None),
        other => other.parse().ok().map(Some),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            cache_duration: Some(60),
            cleanup_interval: 30,
            request_timeout: 10,
        }
    }
}
