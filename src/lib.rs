//! Polycache - a policy-driven, multi-backend cache service
//!
//! Provides key/value caching with TTL expiry, pluggable storage backends,
//! interchangeable eviction strategies (LRU/LFU/FIFO/TTL), tag and pattern
//! invalidation, cache-aside helpers, warm-up and live statistics, plus a
//! small REST surface exposing the cache over HTTP.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheOptions, CacheService, EvictionStrategy};
pub use config::Config;
pub use tasks::spawn_sweep_task;
