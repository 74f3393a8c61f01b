//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{SpatialCache, DEFAULT_EXPIRATION_SECS, DEFAULT_MAX_ENTRIES};
use crate::fetch::DEFAULT_FETCH_TIMEOUT_SECS;
use crate::geo::{DEFAULT_CHANGE_THRESHOLD, DEFAULT_OVERLAP_THRESHOLD};
use crate::reconciler::{ReconcilerSettings, DEFAULT_DEBOUNCE_MS, DEFAULT_MANY_THRESHOLD};

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of regions the spatial cache holds
    pub max_entries: usize,
    /// Age in seconds after which a cached region is ignored
    pub expiration_secs: u64,
    /// Overlap ratio both rectangles need for a cache hit
    pub overlap_threshold: f64,
    /// Overlap ratio below which a viewport change triggers evaluation
    pub change_threshold: f64,
    /// Quiet period in milliseconds before a viewport change is evaluated
    pub debounce_ms: u64,
    /// Time budget in seconds for one region fetch
    pub fetch_timeout_secs: u64,
    /// Result count above which the status becomes `many`
    pub many_threshold: usize,
    /// Background cache sweep interval in seconds
    pub sweep_interval: u64,
    /// HTTP server port
    pub server_port: u16,
    /// JSON file of place documents; an empty in-memory store when unset
    pub places_file: Option<PathBuf>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_CACHE_ENTRIES` - Maximum cached regions (default: 20)
    /// - `CACHE_EXPIRATION_SECS` - Region expiry in seconds (default: 300)
    /// - `CACHE_OVERLAP_THRESHOLD` - Cache hit overlap ratio (default: 0.7)
    /// - `CHANGE_THRESHOLD` - Viewport change overlap ratio (default: 0.3)
    /// - `DEBOUNCE_MS` - Viewport debounce in milliseconds (default: 300)
    /// - `FETCH_TIMEOUT_SECS` - Region fetch timeout in seconds (default: 15)
    /// - `MANY_PLACES_THRESHOLD` - Count above which status is `many` (default: 20)
    /// - `SWEEP_INTERVAL_SECS` - Cache sweep frequency in seconds (default: 60)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `PLACES_FILE` - Path to a JSON array of place documents (optional)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: env_or("MAX_CACHE_ENTRIES", defaults.max_entries),
            expiration_secs: env_or("CACHE_EXPIRATION_SECS", defaults.expiration_secs),
            overlap_threshold: env_or("CACHE_OVERLAP_THRESHOLD", defaults.overlap_threshold),
            change_threshold: env_or("CHANGE_THRESHOLD", defaults.change_threshold),
            debounce_ms: env_or("DEBOUNCE_MS", defaults.debounce_ms),
            fetch_timeout_secs: env_or("FETCH_TIMEOUT_SECS", defaults.fetch_timeout_secs),
            many_threshold: env_or("MANY_PLACES_THRESHOLD", defaults.many_threshold),
            sweep_interval: env_or("SWEEP_INTERVAL_SECS", defaults.sweep_interval),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            places_file: env::var("PLACES_FILE")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }

    /// Builds an empty spatial cache from the cache settings.
    pub fn spatial_cache(&self) -> SpatialCache {
        SpatialCache::new(self.max_entries, Duration::from_secs(self.expiration_secs))
            .with_overlap_threshold(self.overlap_threshold)
    }

    /// Reconciler tunables.
    pub fn reconciler_settings(&self) -> ReconcilerSettings {
        ReconcilerSettings {
            debounce: Duration::from_millis(self.debounce_ms),
            change_threshold: self.change_threshold,
            many_threshold: self.many_threshold,
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            expiration_secs: DEFAULT_EXPIRATION_SECS,
            overlap_threshold: DEFAULT_OVERLAP_THRESHOLD,
            change_threshold: DEFAULT_CHANGE_THRESHOLD,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            many_threshold: DEFAULT_MANY_THRESHOLD,
            sweep_interval: 60,
            server_port: 3000,
            places_file: None,
        }
    }
}

/// Parses an environment variable, falling back to `default` when unset or malformed.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.max_entries, 20);
        assert_eq!(config.expiration_secs, 300);
        assert_eq!(config.overlap_threshold, 0.7);
        assert_eq!(config.change_threshold, 0.3);
        assert_eq!(config.debounce_ms, 300);
        assert_eq!(config.fetch_timeout_secs, 15);
        assert_eq!(config.many_threshold, 20);
        assert_eq!(config.server_port, 3000);
        assert!(config.places_file.is_none());
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        for key in [
            "MAX_CACHE_ENTRIES",
            "CACHE_EXPIRATION_SECS",
            "CACHE_OVERLAP_THRESHOLD",
            "CHANGE_THRESHOLD",
            "DEBOUNCE_MS",
            "FETCH_TIMEOUT_SECS",
            "MANY_PLACES_THRESHOLD",
            "SWEEP_INTERVAL_SECS",
            "SERVER_PORT",
            "PLACES_FILE",
        ] {
            env::remove_var(key);
        }

        let config = Config::from_env();
        assert_eq!(config.max_entries, 20);
        assert_eq!(config.debounce_ms, 300);
        assert_eq!(config.sweep_interval, 60);
        assert!(config.places_file.is_none());
    }

    #[test]
    fn test_derived_settings() {
        let config = Config {
            max_entries: 5,
            debounce_ms: 100,
            ..Config::default()
        };

        let cache = config.spatial_cache();
        assert_eq!(cache.max_entries(), 5);
        assert_eq!(cache.expiration(), Duration::from_secs(300));

        let settings = config.reconciler_settings();
        assert_eq!(settings.debounce, Duration::from_millis(100));
        assert_eq!(config.fetch_timeout(), Duration::from_secs(15));
    }
}
