//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheStats;

/// Response body for the GET operation (GET /get/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: Value,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for the HAS operation (GET /has/:key)
#[derive(Debug, Clone, Serialize)]
pub struct HasResponse {
    /// The requested key
    pub key: String,
    /// Whether a live entry exists
    pub exists: bool,
}

/// Response body for the SET operation (PUT /set)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
}

impl SetResponse {
    /// Creates a new SetResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
        }
    }
}

/// Response body for the DELETE operation (DELETE /del/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was deleted
    pub key: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key,
        }
    }
}

/// Response body for both invalidation endpoints
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// Number of entries removed
    pub invalidated: usize,
}

/// Response body for the clear endpoint (POST /clear)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Names of the backends that were cleared
    pub cleared: Vec<String>,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Backend the entry figures describe
    pub backend: String,
    /// Live entries in the backend
    pub total_entries: usize,
    /// Sum of approximate entry sizes in bytes
    pub total_size: usize,
    /// Service-wide hit count
    pub hit_count: u64,
    /// Service-wide miss count
    pub miss_count: u64,
    /// Service-wide eviction count
    pub evictions: u64,
    /// hits / (hits + misses)
    pub hit_rate: f64,
    /// Earliest creation timestamp among live entries (Unix milliseconds)
    pub oldest_entry: Option<u64>,
    /// Latest creation timestamp among live entries (Unix milliseconds)
    pub newest_entry: Option<u64>,
}

impl StatsResponse {
    /// Creates a new StatsResponse from a backend name and its statistics
    pub fn new(backend: impl Into<String>, stats: CacheStats) -> Self {
        Self {
            backend: backend.into(),
            total_entries: stats.total_entries,
            total_size: stats.total_size,
            hit_count: stats.hit_count,
            miss_count: stats.miss_count,
            evictions: stats.evictions,
            hit_rate: stats.hit_rate,
            oldest_entry: stats.oldest_entry,
            newest_entry: stats.newest_entry,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
