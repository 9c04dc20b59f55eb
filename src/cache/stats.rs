//! Cache Statistics Module
//!
//! Running hit/miss/eviction counters plus the point-in-time statistics
//! report assembled by the service.

use serde::Serialize;

// == Stat Counters ==
/// Service-wide running counters, shared across all backends.
///
/// Hits and misses are recorded only by `get`; `has` is a pure peek and
/// never touches them.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatCounters {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (missing, expired, or undecodable)
    pub misses: u64,
    /// Number of entries removed by the eviction policy
    pub evictions: u64,
}

impl StatCounters {
    /// Creates counters starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 before any request.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Increments the eviction counter.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }
}

// == Cache Stats ==
/// Point-in-time statistics for one backend.
///
/// Hit/miss/eviction counts are service-wide; entry count, size and the
/// created-at extremes describe the live entries of the queried backend.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    /// Live (unexpired) entries in the backend
    pub total_entries: usize,
    /// Sum of approximate entry sizes in bytes
    pub total_size: usize,
    /// Service-wide hit count
    pub hit_count: u64,
    /// Service-wide miss count
    pub miss_count: u64,
    /// Service-wide eviction count
    pub evictions: u64,
    /// hits / (hits + misses), 0.0 before any request
    pub hit_rate: f64,
    /// Earliest `created_at` among live entries (Unix milliseconds)
    pub oldest_entry: Option<u64>,
    /// Latest `created_at` among live entries (Unix milliseconds)
    pub newest_entry: Option<u64>,
}
