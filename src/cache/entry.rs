//! Cache Entry Module
//!
//! Defines the stored record for a single cache entry: the type-erased
//! payload plus the metadata driving TTL expiry and eviction ranking.

use std::collections::HashSet;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Cache Entry ==
/// A single cache entry with payload and policy metadata.
///
/// Entries are created by the cache service on `set` and mutated by it on
/// every hit (`access_count`, `last_access`). Backends store entries verbatim
/// and never interpret the metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The stored payload, type-erased as JSON
    pub value: Value,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Lifetime in milliseconds; the entry is dead once this has elapsed
    pub ttl_ms: u64,
    /// Number of successful reads, counting the initial set
    pub access_count: u64,
    /// Timestamp of the most recent read (Unix milliseconds)
    pub last_access: u64,
    /// Caller-assigned importance; higher survives eviction longer
    pub priority: i32,
    /// Approximate serialized byte size, for reporting only
    pub size: usize,
    /// Labels grouping entries for bulk invalidation
    pub tags: HashSet<String>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry.
    ///
    /// # Arguments
    /// * `value` - The payload to store
    /// * `ttl_ms` - Lifetime in milliseconds
    /// * `priority` - Eviction priority (higher survives longer)
    /// * `tags` - Labels for bulk invalidation
    pub fn new(value: Value, ttl_ms: u64, priority: i32, tags: HashSet<String>) -> Self {
        let now = current_timestamp_ms();
        let size = value.to_string().len();

        Self {
            value,
            created_at: now,
            ttl_ms,
            access_count: 1,
            last_access: now,
            priority,
            size,
            tags,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is expired once the current time is
    /// greater than or equal to `created_at + ttl_ms`, so it becomes
    /// unreadable the instant its full TTL has elapsed.
    pub fn is_expired(&self) -> bool {
        current_timestamp_ms() >= self.expires_at()
    }

    // == Expires At ==
    /// Returns the expiry timestamp in Unix milliseconds.
    pub fn expires_at(&self) -> u64 {
        self.created_at.saturating_add(self.ttl_ms)
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self) -> u64 {
        self.expires_at().saturating_sub(current_timestamp_ms())
    }

    // == Touch ==
    /// Records a successful read: bumps the access count and refreshes the
    /// last-access timestamp. Only the cache service calls this, on a hit.
    pub fn touch(&mut self) {
        self.access_count += 1;
        self.last_access = current_timestamp_ms();
    }
}

// == Cache Options ==
/// Per-entry options accepted by `set` and the cache-aside helpers.
///
/// Unset fields fall back to service defaults: the configured default TTL
/// and priority 1.
#[derive(Debug, Clone, Default)]
pub struct CacheOptions {
    /// Time to live; service default when unset
    pub ttl: Option<Duration>,
    /// Eviction priority; defaults to 1
    pub priority: Option<i32>,
    /// Tags for bulk invalidation
    pub tags: Vec<String>,
}

impl CacheOptions {
    /// Sets the time to live.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Sets the eviction priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Adds an invalidation tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
