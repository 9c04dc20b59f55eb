//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::cache::{CacheOptions, MAX_KEY_LENGTH, MAX_VALUE_SIZE};

/// Request body for the SET operation (PUT /set)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: The value to store (any JSON)
/// - `ttl_ms`: Optional TTL in milliseconds (service default if not specified)
/// - `priority`: Optional eviction priority (default 1)
/// - `tags`: Optional invalidation tags
/// - `backend`: Optional backend name (service default if not specified)
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The value to store
    pub value: Value,
    /// Optional TTL in milliseconds
    #[serde(default)]
    pub ttl_ms: Option<u64>,
    /// Optional eviction priority
    #[serde(default)]
    pub priority: Option<i32>,
    /// Optional invalidation tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Optional backend name
    #[serde(default)]
    pub backend: Option<String>,
}

impl SetRequest {
    /// Validates the request data.
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.key.len() > MAX_KEY_LENGTH {
            return Some(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            ));
        }
        if self.value.to_string().len() > MAX_VALUE_SIZE {
            return Some(format!(
                "Value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            ));
        }
        None
    }

    /// Converts the per-request fields into cache options.
    pub fn options(&self) -> CacheOptions {
        CacheOptions {
            ttl: self.ttl_ms.map(Duration::from_millis),
            priority: self.priority,
            tags: self.tags.clone(),
        }
    }
}

/// Request body for tag invalidation (POST /invalidate/tags)
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidateTagsRequest {
    /// Tags to invalidate; entries sharing any of them are removed
    pub tags: Vec<String>,
    /// Optional backend name
    #[serde(default)]
    pub backend: Option<String>,
}

/// Request body for key-pattern invalidation (POST /invalidate/pattern)
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidatePatternRequest {
    /// Regular expression matched against keys
    pub pattern: String,
    /// Optional backend name
    #[serde(default)]
    pub backend: Option<String>,
}

/// Query parameters selecting a backend (GET /get/:key?backend=disk etc.)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendQuery {
    /// Optional backend name
    #[serde(default)]
    pub backend: Option<String>,
}

/// Query parameters for the clear endpoint (POST /clear)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClearQuery {
    /// Optional backend name
    #[serde(default)]
    pub backend: Option<String>,
    /// Clear every registered backend when true
    #[serde(default)]
    pub all: bool,
}
