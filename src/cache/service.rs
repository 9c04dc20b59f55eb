//! Cache Service Module
//!
//! The orchestrator layered over any `CacheBackend`: TTL enforcement,
//! eviction, tag and pattern invalidation, the expiry sweep, and statistics
//! bookkeeping. Callers always go through the service; backends are never
//! touched directly.

use std::collections::HashSet;
use std::time::Duration;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::{
    CacheBackend, CacheEntry, CacheOptions, CacheStats, EvictionStrategy, FileBackend,
    MemoryBackend, StatCounters,
};
use crate::config::Config;
use crate::error::{CacheError, Result};

/// Name under which the built-in memory backend is registered.
pub const MEMORY_BACKEND: &str = "memory";

/// Name under which the built-in persistent backend is registered.
pub const DISK_BACKEND: &str = "disk";

// == Backend Handle ==
/// Opaque handle to a registered backend, returned by
/// [`CacheService::register_backend`].
///
/// Handles are cheap to copy and stay valid for the lifetime of the service
/// that issued them; using a handle from a different service instance is a
/// soft failure, not a panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendId(usize);

// == Config Update ==
/// Runtime reconfiguration accepted by [`CacheService::configure`].
///
/// Unset fields leave the current setting untouched.
#[derive(Debug, Clone, Default)]
pub struct ConfigUpdate {
    /// Entries per backend before eviction triggers
    pub max_size: Option<usize>,
    /// TTL applied when `set` omits one
    pub default_ttl: Option<Duration>,
    /// Victim-selection policy
    pub eviction_strategy: Option<EvictionStrategy>,
    /// Entries evicted per eviction pass
    pub eviction_batch: Option<usize>,
    /// Name of the backend new calls should default to
    pub default_backend: Option<String>,
}

// == Cache Service ==
/// Policy-driven cache over a registry of named backends.
///
/// Constructed explicitly and handed to consumers by the composition root;
/// there is no global instance. All storage operations delegate to the
/// selected backend while policy (TTL, eviction, stats) stays here, so a new
/// backend implementation never reimplements policy.
pub struct CacheService {
    backends: Vec<(String, Box<dyn CacheBackend>)>,
    default_backend: BackendId,
    max_size: usize,
    default_ttl: Duration,
    eviction_batch: usize,
    strategy: EvictionStrategy,
    counters: StatCounters,
}

impl CacheService {
    // == Constructor ==
    /// Creates a service with the built-in memory backend registered and
    /// selected as default.
    ///
    /// # Arguments
    /// * `max_size` - Entries per backend before eviction triggers
    /// * `default_ttl` - TTL applied when `set` omits one
    pub fn new(max_size: usize, default_ttl: Duration) -> Self {
        let mut service = Self {
            backends: Vec::new(),
            default_backend: BackendId(0),
            max_size,
            default_ttl,
            eviction_batch: 1,
            strategy: EvictionStrategy::default(),
            counters: StatCounters::new(),
        };
        service.register_backend(MEMORY_BACKEND, Box::new(MemoryBackend::new()));

        info!(
            max_size,
            default_ttl_ms = default_ttl.as_millis() as u64,
            "Cache service initialized"
        );
        service
    }

    /// Creates a service from configuration, registering the persistent
    /// `disk` backend when a persist path is configured.
    pub fn from_config(config: &Config) -> Self {
        let mut service = Self::new(config.max_size, Duration::from_millis(config.default_ttl_ms));
        service.strategy = config.eviction_strategy;
        service.eviction_batch = config.eviction_batch.max(1);

        if let Some(path) = &config.persist_path {
            service.register_backend(DISK_BACKEND, Box::new(FileBackend::new(path)));
        }
        service
    }

    // == Backend Registry ==
    /// Registers a backend under `name` and returns its handle.
    ///
    /// Re-registering an existing name replaces the backend in place; the
    /// previously issued handle stays valid.
    pub fn register_backend(&mut self, name: &str, backend: Box<dyn CacheBackend>) -> BackendId {
        if let Some(pos) = self.backends.iter().position(|(n, _)| n == name) {
            self.backends[pos].1 = backend;
            BackendId(pos)
        } else {
            self.backends.push((name.to_string(), backend));
            BackendId(self.backends.len() - 1)
        }
    }

    /// Resolves a backend name to its handle, for configuration-driven
    /// selection.
    pub fn backend_id(&self, name: &str) -> Option<BackendId> {
        self.backends.iter().position(|(n, _)| n == name).map(BackendId)
    }

    /// Handle of the backend used when callers do not choose one.
    pub fn default_backend(&self) -> BackendId {
        self.default_backend
    }

    /// Names of all registered backends.
    pub fn backend_names(&self) -> Vec<String> {
        self.backends.iter().map(|(name, _)| name.clone()).collect()
    }

    /// Name a backend handle was registered under.
    pub fn backend_name(&self, backend: BackendId) -> Option<&str> {
        self.backends.get(backend.0).map(|(name, _)| name.as_str())
    }

    // == Configure ==
    /// Applies a runtime configuration update.
    ///
    /// The only hard failure in the public surface: an unknown
    /// `default_backend` name is rejected with `BackendNotFound`.
    pub fn configure(&mut self, update: ConfigUpdate) -> Result<()> {
        if let Some(max_size) = update.max_size {
            self.max_size = max_size;
        }
        if let Some(default_ttl) = update.default_ttl {
            self.default_ttl = default_ttl;
        }
        if let Some(strategy) = update.eviction_strategy {
            self.strategy = strategy;
        }
        if let Some(batch) = update.eviction_batch {
            self.eviction_batch = batch.max(1);
        }
        if let Some(name) = update.default_backend {
            self.default_backend = self
                .backend_id(&name)
                .ok_or(CacheError::BackendNotFound(name))?;
        }

        info!(
            max_size = self.max_size,
            default_ttl_ms = self.default_ttl.as_millis() as u64,
            strategy = %self.strategy,
            "Cache configuration updated"
        );
        Ok(())
    }

    // == Get ==
    /// Retrieves and decodes the value for `key`.
    ///
    /// Expiry is enforced lazily here: an expired entry is deleted and
    /// counted as a miss. On a hit the entry's access metadata is updated
    /// and written back before the value is returned. A value that fails to
    /// decode into `T` is a logged miss.
    pub fn get<T: DeserializeOwned>(&mut self, backend: BackendId, key: &str) -> Option<T> {
        let Some((_, store)) = self.backends.get_mut(backend.0) else {
            warn!("Cache backend not found: {:?}", backend);
            return None;
        };

        let Some(mut entry) = store.get(key) else {
            self.counters.record_miss();
            debug!("Cache miss: {}", key);
            return None;
        };

        if entry.is_expired() {
            store.delete(key);
            self.counters.record_miss();
            debug!("Cache expired: {}", key);
            return None;
        }

        entry.touch();
        let value = entry.value.clone();
        store.set(key, entry);

        match serde_json::from_value::<T>(value) {
            Ok(value) => {
                self.counters.record_hit();
                debug!("Cache hit: {}", key);
                Some(value)
            }
            Err(err) => {
                warn!("Failed to decode cached value for key {}: {}", key, err);
                self.counters.record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Encodes and stores `value` under `key`, replacing any prior entry.
    ///
    /// When the backend is at capacity an eviction pass frees
    /// `eviction_batch` slots first. A value that fails to encode is a
    /// logged no-op.
    pub fn set<T: Serialize>(
        &mut self,
        backend: BackendId,
        key: &str,
        value: &T,
        options: &CacheOptions,
    ) {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(err) => {
                warn!("Failed to encode value for cache key {}: {}", key, err);
                return;
            }
        };

        let at_capacity = match self.backends.get(backend.0) {
            Some((_, store)) => store.size() >= self.max_size,
            None => {
                warn!("Cache backend not found: {:?}", backend);
                return;
            }
        };
        if at_capacity {
            self.evict(backend, self.eviction_batch);
        }

        let ttl_ms = options.ttl.unwrap_or(self.default_ttl).as_millis() as u64;
        let priority = options.priority.unwrap_or(1);
        let tags: HashSet<String> = options.tags.iter().cloned().collect();

        let entry = CacheEntry::new(value, ttl_ms, priority, tags);
        debug!(ttl_ms, priority, size = entry.size, "Cache set: {}", key);

        if let Some((_, store)) = self.backends.get_mut(backend.0) {
            store.set(key, entry);
        }
    }

    // == Has ==
    /// Existence check with `get`'s expiry logic but none of its side
    /// effects: access metadata is untouched and no counters move.
    pub fn has(&mut self, backend: BackendId, key: &str) -> bool {
        let Some((_, store)) = self.backends.get_mut(backend.0) else {
            return false;
        };

        let Some(entry) = store.get(key) else {
            return false;
        };

        if entry.is_expired() {
            store.delete(key);
            return false;
        }
        true
    }

    // == Delete ==
    /// Removes the entry for `key`; returns whether anything was removed.
    pub fn delete(&mut self, backend: BackendId, key: &str) -> bool {
        let Some((_, store)) = self.backends.get_mut(backend.0) else {
            return false;
        };

        let deleted = store.delete(key);
        if deleted {
            debug!("Cache delete: {}", key);
        }
        deleted
    }

    // == Clear ==
    /// Removes every entry from one backend.
    pub fn clear(&mut self, backend: BackendId) {
        if let Some((name, store)) = self.backends.get_mut(backend.0) {
            store.clear();
            info!("Cache cleared for backend: {}", name);
        }
    }

    /// Removes every entry from every registered backend.
    pub fn clear_all(&mut self) {
        for (name, store) in &mut self.backends {
            store.clear();
            info!("Cache cleared for backend: {}", name);
        }
    }

    // == Tag Invalidation ==
    /// Deletes entries whose tag set intersects `tags`; returns the count
    /// removed. O(n) over the backend.
    pub fn invalidate_by_tags(&mut self, backend: BackendId, tags: &[String]) -> usize {
        let Some((_, store)) = self.backends.get_mut(backend.0) else {
            return 0;
        };

        let mut invalidated = 0;
        for key in store.keys() {
            let tagged = match store.get(&key) {
                Some(entry) => entry.tags.iter().any(|tag| tags.contains(tag)),
                None => false,
            };
            if tagged && store.delete(&key) {
                invalidated += 1;
            }
        }

        if invalidated > 0 {
            info!(?tags, "Invalidated {} cache entries by tags", invalidated);
        }
        invalidated
    }

    // == Pattern Invalidation ==
    /// Deletes entries whose key matches `pattern`; returns the count
    /// removed. Matches keys, never values.
    pub fn invalidate_by_pattern(&mut self, backend: BackendId, pattern: &Regex) -> usize {
        let Some((_, store)) = self.backends.get_mut(backend.0) else {
            return 0;
        };

        let mut invalidated = 0;
        for key in store.keys() {
            if pattern.is_match(&key) && store.delete(&key) {
                invalidated += 1;
            }
        }

        if invalidated > 0 {
            info!(
                pattern = pattern.as_str(),
                "Invalidated {} cache entries by pattern", invalidated
            );
        }
        invalidated
    }

    // == Expiry Sweep ==
    /// Removes expired entries from every backend; returns the count
    /// removed.
    ///
    /// Purely a reclamation pass: expiry correctness is already guaranteed
    /// by the lazy checks in `get` and `has`. Keys may vanish between
    /// listing and deletion, which is not an error.
    pub fn sweep(&mut self) -> usize {
        let mut removed = 0;
        for (_, store) in &mut self.backends {
            for key in store.keys() {
                let expired = matches!(store.get(&key), Some(entry) if entry.is_expired());
                if expired && store.delete(&key) {
                    removed += 1;
                }
            }
        }

        if removed > 0 {
            debug!("Sweep removed {} expired cache entries", removed);
        }
        removed
    }

    // == Stats ==
    /// Returns statistics: service-wide hit/miss/eviction counts plus the
    /// live entry count, total size and created-at extremes of one backend.
    pub fn get_stats(&self, backend: BackendId) -> CacheStats {
        let mut stats = CacheStats {
            total_entries: 0,
            total_size: 0,
            hit_count: self.counters.hits,
            miss_count: self.counters.misses,
            evictions: self.counters.evictions,
            hit_rate: self.counters.hit_rate(),
            oldest_entry: None,
            newest_entry: None,
        };

        let Some((_, store)) = self.backends.get(backend.0) else {
            return stats;
        };

        for key in store.keys() {
            let Some(entry) = store.get(&key) else {
                continue;
            };
            if entry.is_expired() {
                continue;
            }

            stats.total_entries += 1;
            stats.total_size += entry.size;
            stats.oldest_entry = Some(
                stats
                    .oldest_entry
                    .map_or(entry.created_at, |t| t.min(entry.created_at)),
            );
            stats.newest_entry = Some(
                stats
                    .newest_entry
                    .map_or(entry.created_at, |t| t.max(entry.created_at)),
            );
        }
        stats
    }

    // == Eviction ==
    /// Frees `count` slots in the backend using the configured strategy.
    fn evict(&mut self, backend: BackendId, count: usize) {
        let Some((name, store)) = self.backends.get_mut(backend.0) else {
            return;
        };

        let candidates: Vec<(String, CacheEntry)> = store
            .keys()
            .into_iter()
            .filter_map(|key| store.get(&key).map(|entry| (key, entry)))
            .collect();

        let victims = self.strategy.select_victims(&candidates, count);
        for key in &victims {
            if store.delete(key) {
                self.counters.record_eviction();
            }
        }

        if !victims.is_empty() {
            info!(
                strategy = %self.strategy,
                backend = %name,
                "Evicted {} cache entries", victims.len()
            );
        }
    }
}

impl Default for CacheService {
    fn default() -> Self {
        Self::new(1000, Duration::from_secs(5 * 60))
    }
}
