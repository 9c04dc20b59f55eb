//! Cache Presets Module
//!
//! Named TTL/priority/tag bundles for common entry lifetimes. Convenience
//! only; nothing in the service treats preset entries specially.

use std::time::Duration;

use crate::cache::CacheOptions;

/// 30 second TTL, low priority. Volatile data such as search results.
pub fn short() -> CacheOptions {
    CacheOptions::default()
        .with_ttl(Duration::from_secs(30))
        .with_priority(1)
}

/// 5 minute TTL, medium priority.
pub fn medium() -> CacheOptions {
    CacheOptions::default()
        .with_ttl(Duration::from_secs(5 * 60))
        .with_priority(2)
}

/// 30 minute TTL, high priority.
pub fn long() -> CacheOptions {
    CacheOptions::default()
        .with_ttl(Duration::from_secs(30 * 60))
        .with_priority(3)
}

/// 10 minute TTL, highest priority, tagged `user` for bulk invalidation
/// when the signed-in user changes.
pub fn user_data() -> CacheOptions {
    CacheOptions::default()
        .with_ttl(Duration::from_secs(10 * 60))
        .with_priority(5)
        .with_tag("user")
}

/// 5 minute TTL, tagged `api`. Responses fetched from upstream services.
pub fn api_data() -> CacheOptions {
    CacheOptions::default()
        .with_ttl(Duration::from_secs(5 * 60))
        .with_priority(3)
        .with_tag("api")
}

/// 1 hour TTL, tagged `static`. Rarely-changing reference data.
pub fn static_data() -> CacheOptions {
    CacheOptions::default()
        .with_ttl(Duration::from_secs(60 * 60))
        .with_priority(4)
        .with_tag("static")
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_preset() {
        let options = short();
        assert_eq!(options.ttl, Some(Duration::from_secs(30)));
        assert_eq!(options.priority, Some(1));
        assert!(options.tags.is_empty());
    }

    #[test]
    fn test_user_data_preset() {
        let options = user_data();
        assert_eq!(options.ttl, Some(Duration::from_secs(600)));
        assert_eq!(options.priority, Some(5));
        assert_eq!(options.tags, vec!["user".to_string()]);
    }

    #[test]
    fn test_preset_ttls_are_ordered() {
        let ttls = [short().ttl, medium().ttl, long().ttl, static_data().ttl];
        for window in ttls.windows(2) {
            assert!(window[0] < window[1]);
        }
    }

    #[test]
    fn test_tagged_presets() {
        assert_eq!(api_data().tags, vec!["api".to_string()]);
        assert_eq!(static_data().tags, vec!["static".to_string()]);
    }
}
