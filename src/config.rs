//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;

use crate::cache::EvictionStrategy;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum entries per backend before eviction triggers
    pub max_size: usize,
    /// Default TTL in milliseconds for entries without an explicit TTL
    pub default_ttl_ms: u64,
    /// Victim-selection policy used when a backend is full
    pub eviction_strategy: EvictionStrategy,
    /// Entries evicted per eviction pass
    pub eviction_batch: usize,
    /// Background expiry sweep interval in seconds
    pub sweep_interval_secs: u64,
    /// HTTP server port
    pub server_port: u16,
    /// File path for the persistent backend; disabled when unset
    pub persist_path: Option<PathBuf>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum entries per backend (default: 1000)
    /// - `DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 300000, 5 minutes)
    /// - `EVICTION_STRATEGY` - `lru`, `lfu`, `fifo` or `ttl` (default: lru)
    /// - `EVICTION_BATCH` - Entries evicted per pass (default: 1)
    /// - `SWEEP_INTERVAL_SECS` - Expiry sweep frequency in seconds (default: 60)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `PERSIST_PATH` - File path enabling the `disk` backend (default: unset)
    pub fn from_env() -> Self {
        Self {
            max_size: env::var("MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            default_ttl_ms: env::var("DEFAULT_TTL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300_000),
            eviction_strategy: env::var("EVICTION_STRATEGY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            eviction_batch: env::var("EVICTION_BATCH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
            sweep_interval_secs: env::var("SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            persist_path: env::var("PERSIST_PATH").ok().map(PathBuf::from),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_size: 1000,
            default_ttl_ms: 300_000,
            eviction_strategy: EvictionStrategy::Lru,
            eviction_batch: 1,
            sweep_interval_secs: 60,
            server_port: 3000,
            persist_path: None,
        }
    }
}
