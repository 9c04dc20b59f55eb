//! Eviction Strategy Module
//!
//! Pure victim-selection policies, one per strategy. Each produces a total
//! order over a snapshot of candidate entries (ascending = evicted first);
//! ties on the primary metric are broken by ascending priority, so lower
//! priority entries go first among equals.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cache::CacheEntry;

// == Eviction Strategy ==
/// Victim-selection policy applied when a backend reaches capacity.
///
/// One global setting for the whole service, switchable at runtime through
/// `CacheService::configure`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionStrategy {
    /// Least Recently Used: oldest `last_access` evicted first
    #[default]
    Lru,
    /// Least Frequently Used: smallest `access_count` evicted first
    Lfu,
    /// First In First Out: oldest `created_at` evicted first
    Fifo,
    /// Nearest expiry: smallest `created_at + ttl` evicted first,
    /// regardless of the current time
    Ttl,
}

impl EvictionStrategy {
    // == Primary Metric ==
    /// The ascending sort key for this strategy.
    fn metric(&self, entry: &CacheEntry) -> u64 {
        match self {
            EvictionStrategy::Lru => entry.last_access,
            EvictionStrategy::Lfu => entry.access_count,
            EvictionStrategy::Fifo => entry.created_at,
            EvictionStrategy::Ttl => entry.expires_at(),
        }
    }

    // == Select Victims ==
    /// Orders the candidate snapshot and returns the first `count` keys to
    /// evict. Returns fewer when the snapshot is smaller than `count`.
    pub fn select_victims(&self, candidates: &[(String, CacheEntry)], count: usize) -> Vec<String> {
        let mut ranked: Vec<&(String, CacheEntry)> = candidates.iter().collect();

        ranked.sort_by(|a, b| {
            self.metric(&a.1)
                .cmp(&self.metric(&b.1))
                .then(a.1.priority.cmp(&b.1.priority))
        });

        ranked
            .into_iter()
            .take(count)
            .map(|(key, _)| key.clone())
            .collect()
    }
}

impl FromStr for EvictionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lru" => Ok(EvictionStrategy::Lru),
            "lfu" => Ok(EvictionStrategy::Lfu),
            "fifo" => Ok(EvictionStrategy::Fifo),
            "ttl" => Ok(EvictionStrategy::Ttl),
            other => Err(format!("Unknown eviction strategy: {}", other)),
        }
    }
}

impl fmt::Display for EvictionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EvictionStrategy::Lru => "lru",
            EvictionStrategy::Lfu => "lfu",
            EvictionStrategy::Fifo => "fifo",
            EvictionStrategy::Ttl => "ttl",
        };
        f.write_str(name)
    }
}
