//! Cache-Aside Module
//!
//! `get_or_set` and warm-up helpers pairing the synchronous service with
//! asynchronous, fallible value factories. The service lock is never held
//! across a factory await, so cache calls interleave at suspension points.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::cache::{BackendId, CacheOptions, CacheService};
use crate::error::{CacheError, Result};

/// Shared, lock-guarded cache service handle used by the async helpers, the
/// HTTP surface and the background sweep task.
pub type SharedCacheService = Arc<RwLock<CacheService>>;

// == Get Or Set ==
/// Returns the cached value for `key`, or runs `factory`, caches its result
/// under `options`, and returns it.
///
/// A factory error propagates to the caller and nothing is cached. Not
/// atomic across tasks: two callers racing on the same uncached key may both
/// run their factory, and the last `set` wins. Both results are equally
/// valid, so the duplicate work is tolerated rather than serialized.
pub async fn get_or_set<T, F, Fut>(
    cache: &SharedCacheService,
    backend: BackendId,
    key: &str,
    factory: F,
    options: &CacheOptions,
) -> Result<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    if let Some(value) = cache.write().await.get::<T>(backend, key) {
        return Ok(value);
    }

    let value = factory().await.map_err(CacheError::Factory)?;
    cache.write().await.set(backend, key, &value, options);
    Ok(value)
}

// == Warm Entry ==
/// Boxed future produced by a warm-up factory, yielding the encoded value.
type WarmFuture = Pin<Box<dyn Future<Output = anyhow::Result<Value>> + Send>>;

/// One entry of a warm-up batch: a key, the factory producing its value,
/// and the options to cache it under.
pub struct WarmEntry {
    pub key: String,
    pub options: CacheOptions,
    factory: Box<dyn FnOnce() -> WarmFuture + Send>,
}

impl WarmEntry {
    /// Creates a warm-up entry from an async factory returning any
    /// serializable value.
    pub fn new<T, F, Fut>(key: impl Into<String>, factory: F, options: CacheOptions) -> Self
    where
        T: Serialize,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        Self {
            key: key.into(),
            options,
            factory: Box::new(move || -> WarmFuture {
                Box::pin(async move {
                    let value = factory().await?;
                    Ok(serde_json::to_value(value)?)
                })
            }),
        }
    }
}

// == Warm ==
/// Populates missing entries ahead of first use; returns the number of
/// entries actually populated.
///
/// Keys already cached are left untouched, never refreshed. All factories
/// run concurrently; an individual failure is logged and does not abort the
/// remaining entries.
pub async fn warm(cache: &SharedCacheService, backend: BackendId, entries: Vec<WarmEntry>) -> usize {
    info!("Warming cache with {} entries", entries.len());

    let mut tasks = JoinSet::new();
    for entry in entries {
        let cache = Arc::clone(cache);
        tasks.spawn(async move {
            if cache.write().await.has(backend, &entry.key) {
                return false;
            }

            match (entry.factory)().await {
                Ok(value) => {
                    cache
                        .write()
                        .await
                        .set(backend, &entry.key, &value, &entry.options);
                    true
                }
                Err(err) => {
                    warn!("Failed to warm cache for key {}: {}", entry.key, err);
                    false
                }
            }
        });
    }

    let mut populated = 0;
    while let Some(result) = tasks.join_next().await {
        if matches!(result, Ok(true)) {
            populated += 1;
        }
    }
    populated
}
