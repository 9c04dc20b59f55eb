//! Expiry Sweep Task
//!
//! Background task that periodically removes expired entries from every
//! registered backend. Reclamation only: expiry correctness is guaranteed
//! independently by the lazy checks in `get`/`has`.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCacheService;

/// Spawns a background task that sweeps expired cache entries at a fixed
/// interval.
///
/// The task loops forever, sleeping between passes; each pass takes the
/// service write lock only for the duration of the synchronous sweep, never
/// across a suspension point.
///
/// # Arguments
/// * `cache` - Shared cache service handle
/// * `sweep_interval_secs` - Interval in seconds between sweep passes
///
/// # Returns
/// A JoinHandle for the spawned task, used to abort it during graceful
/// shutdown.
pub fn spawn_sweep_task(cache: SharedCacheService, sweep_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(sweep_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting expiry sweep task with interval of {} seconds",
            sweep_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut service = cache.write().await;
                service.sweep()
            };

            if removed > 0 {
                info!("Expiry sweep removed {} entries", removed);
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheOptions, CacheService};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    fn shared_service() -> SharedCacheService {
        Arc::new(RwLock::new(CacheService::new(
            100,
            Duration::from_secs(300),
        )))
    }

    #[tokio::test]
    async fn test_sweep_task_removes_expired_entries() {
        let cache = shared_service();
        let backend = cache.read().await.default_backend();

        {
            let mut service = cache.write().await;
            let options = CacheOptions::default().with_ttl(Duration::from_millis(100));
            service.set(backend, "expire_soon", &1_u64, &options);
        }

        let handle = spawn_sweep_task(Arc::clone(&cache), 1);

        // Wait for the entry to expire and a sweep pass to run
        tokio::time::sleep(Duration::from_millis(2500)).await;

        {
            let service = cache.read().await;
            assert_eq!(
                service.get_stats(backend).total_entries,
                0,
                "Expired entry should have been swept"
            );
        }

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_preserves_valid_entries() {
        let cache = shared_service();
        let backend = cache.read().await.default_backend();

        {
            let mut service = cache.write().await;
            let options = CacheOptions::default().with_ttl(Duration::from_secs(3600));
            service.set(backend, "long_lived", &1_u64, &options);
        }

        let handle = spawn_sweep_task(Arc::clone(&cache), 1);

        tokio::time::sleep(Duration::from_millis(1500)).await;

        {
            let mut service = cache.write().await;
            assert_eq!(
                service.get::<u64>(backend, "long_lived"),
                Some(1),
                "Valid entry should not be swept"
            );
        }

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_can_be_aborted() {
        let cache = shared_service();

        let handle = spawn_sweep_task(cache, 1);
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
