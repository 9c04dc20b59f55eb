//! Cache Module
//!
//! Policy-driven key/value caching: TTL expiry, pluggable storage backends,
//! interchangeable eviction strategies, tag and pattern invalidation,
//! cache-aside helpers and live statistics.

mod aside;
mod backend;
mod entry;
mod eviction;
mod file;
mod service;
mod stats;

pub mod presets;


// Re-export public types
pub use aside::{get_or_set, warm, SharedCacheService, WarmEntry};
pub use backend::{CacheBackend, MemoryBackend};
pub use entry::{current_timestamp_ms, CacheEntry, CacheOptions};
pub use eviction::EvictionStrategy;
pub use file::FileBackend;
pub use service::{
    BackendId, CacheService, ConfigUpdate, DISK_BACKEND, MEMORY_BACKEND,
};
pub use stats::{CacheStats, StatCounters};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed serialized value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB
