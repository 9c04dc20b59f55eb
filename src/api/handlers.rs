//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint. Handlers resolve
//! the optional `backend` selector to a handle up front, so an unknown name
//! surfaces as a 404 instead of a silent default.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use regex::Regex;
use tokio::sync::RwLock;

use crate::cache::{BackendId, CacheService, SharedCacheService};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    BackendQuery, ClearQuery, ClearResponse, DeleteResponse, GetResponse, HasResponse,
    HealthResponse, InvalidatePatternRequest, InvalidateTagsRequest, InvalidateResponse,
    SetRequest, SetResponse, StatsResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Lock-guarded cache service shared with the sweep task
    pub cache: SharedCacheService,
}

impl AppState {
    /// Creates a new AppState around the given cache service.
    pub fn new(service: CacheService) -> Self {
        Self {
            cache: Arc::new(RwLock::new(service)),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(CacheService::from_config(config))
    }
}

/// Resolves an optional backend name against the registry.
fn resolve_backend(service: &CacheService, name: Option<&str>) -> Result<BackendId> {
    match name {
        None => Ok(service.default_backend()),
        Some(name) => service
            .backend_id(name)
            .ok_or_else(|| CacheError::BackendNotFound(name.to_string())),
    }
}

/// Handler for PUT /set
///
/// Stores a value in the cache with optional TTL, priority and tags.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let mut cache = state.cache.write().await;
    let backend = resolve_backend(&cache, req.backend.as_deref())?;
    cache.set(backend, &req.key, &req.value, &req.options());

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /get/:key
///
/// Retrieves a value from the cache by key. Missing and expired entries are
/// both 404.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<BackendQuery>,
) -> Result<Json<GetResponse>> {
    // Write lock: a hit updates access metadata, a dead entry is deleted
    let mut cache = state.cache.write().await;
    let backend = resolve_backend(&cache, query.backend.as_deref())?;

    match cache.get(backend, &key) {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for GET /has/:key
///
/// Pure existence peek: no access metadata or hit/miss counter changes.
pub async fn has_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<BackendQuery>,
) -> Result<Json<HasResponse>> {
    let mut cache = state.cache.write().await;
    let backend = resolve_backend(&cache, query.backend.as_deref())?;
    let exists = cache.has(backend, &key);

    Ok(Json(HasResponse { key, exists }))
}

/// Handler for DELETE /del/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<BackendQuery>,
) -> Result<Json<DeleteResponse>> {
    let mut cache = state.cache.write().await;
    let backend = resolve_backend(&cache, query.backend.as_deref())?;

    if cache.delete(backend, &key) {
        Ok(Json(DeleteResponse::new(key)))
    } else {
        Err(CacheError::NotFound(key))
    }
}

/// Handler for POST /invalidate/tags
///
/// Removes every entry sharing at least one of the given tags.
pub async fn invalidate_tags_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateTagsRequest>,
) -> Result<Json<InvalidateResponse>> {
    if req.tags.is_empty() {
        return Err(CacheError::InvalidRequest(
            "Tags cannot be empty".to_string(),
        ));
    }

    let mut cache = state.cache.write().await;
    let backend = resolve_backend(&cache, req.backend.as_deref())?;
    let invalidated = cache.invalidate_by_tags(backend, &req.tags);

    Ok(Json(InvalidateResponse { invalidated }))
}

/// Handler for POST /invalidate/pattern
///
/// Removes every entry whose key matches the given regular expression.
pub async fn invalidate_pattern_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidatePatternRequest>,
) -> Result<Json<InvalidateResponse>> {
    let pattern = Regex::new(&req.pattern)
        .map_err(|err| CacheError::InvalidRequest(format!("Invalid pattern: {}", err)))?;

    let mut cache = state.cache.write().await;
    let backend = resolve_backend(&cache, req.backend.as_deref())?;
    let invalidated = cache.invalidate_by_pattern(backend, &pattern);

    Ok(Json(InvalidateResponse { invalidated }))
}

/// Handler for POST /clear
///
/// Clears one backend, or every backend with `?all=true`.
pub async fn clear_handler(
    State(state): State<AppState>,
    Query(query): Query<ClearQuery>,
) -> Result<Json<ClearResponse>> {
    let mut cache = state.cache.write().await;

    if query.all {
        cache.clear_all();
        return Ok(Json(ClearResponse {
            cleared: cache.backend_names(),
        }));
    }

    let backend = resolve_backend(&cache, query.backend.as_deref())?;
    cache.clear(backend);
    let name = cache
        .backend_name(backend)
        .unwrap_or_default()
        .to_string();

    Ok(Json(ClearResponse {
        cleared: vec![name],
    }))
}

/// Handler for GET /stats
///
/// Returns service-wide hit/miss counters plus per-backend entry figures.
pub async fn stats_handler(
    State(state): State<AppState>,
    Query(query): Query<BackendQuery>,
) -> Result<Json<StatsResponse>> {
    let cache = state.cache.read().await;
    let backend = resolve_backend(&cache, query.backend.as_deref())?;
    let stats = cache.get_stats(backend);
    let name = cache.backend_name(backend).unwrap_or_default().to_string();

    Ok(Json(StatsResponse::new(name, stats)))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn test_state() -> AppState {
        AppState::new(CacheService::new(100, Duration::from_secs(300)))
    }

    fn set_request(key: &str, value: serde_json::Value) -> SetRequest {
        SetRequest {
            key: key.to_string(),
            value,
            ttl_ms: None,
            priority: None,
            tags: vec![],
            backend: None,
        }
    }

    #[tokio::test]
    async fn test_set_and_get_handler() {
        let state = test_state();

        let result = set_handler(
            State(state.clone()),
            Json(set_request("test_key", json!("test_value"))),
        )
        .await;
        assert!(result.is_ok());

        let result = get_handler(
            State(state),
            Path("test_key".to_string()),
            Query(BackendQuery::default()),
        )
        .await;
        let response = result.unwrap();
        assert_eq!(response.value, json!("test_value"));
    }

    #[tokio::test]
    async fn test_get_nonexistent_key() {
        let state = test_state();

        let result = get_handler(
            State(state),
            Path("nonexistent".to_string()),
            Query(BackendQuery::default()),
        )
        .await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unknown_backend_is_not_found() {
        let state = test_state();

        let result = get_handler(
            State(state),
            Path("key".to_string()),
            Query(BackendQuery {
                backend: Some("bogus".to_string()),
            }),
        )
        .await;
        assert!(matches!(result, Err(CacheError::BackendNotFound(_))));
    }

    #[tokio::test]
    async fn test_has_handler() {
        let state = test_state();

        set_handler(State(state.clone()), Json(set_request("k", json!(1))))
            .await
            .unwrap();

        let response = has_handler(
            State(state.clone()),
            Path("k".to_string()),
            Query(BackendQuery::default()),
        )
        .await
        .unwrap();
        assert!(response.exists);

        let response = has_handler(
            State(state),
            Path("missing".to_string()),
            Query(BackendQuery::default()),
        )
        .await
        .unwrap();
        assert!(!response.exists);
    }

    #[tokio::test]
    async fn test_delete_handler() {
        let state = test_state();

        set_handler(State(state.clone()), Json(set_request("to_delete", json!(1))))
            .await
            .unwrap();

        let result = delete_handler(
            State(state.clone()),
            Path("to_delete".to_string()),
            Query(BackendQuery::default()),
        )
        .await;
        assert!(result.is_ok());

        let result = delete_handler(
            State(state),
            Path("to_delete".to_string()),
            Query(BackendQuery::default()),
        )
        .await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_invalidate_tags_handler() {
        let state = test_state();

        let mut tagged = set_request("a", json!(1));
        tagged.tags = vec!["user".to_string()];
        set_handler(State(state.clone()), Json(tagged)).await.unwrap();
        set_handler(State(state.clone()), Json(set_request("b", json!(2))))
            .await
            .unwrap();

        let response = invalidate_tags_handler(
            State(state),
            Json(InvalidateTagsRequest {
                tags: vec!["user".to_string()],
                backend: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.invalidated, 1);
    }

    #[tokio::test]
    async fn test_invalidate_tags_rejects_empty() {
        let state = test_state();

        let result = invalidate_tags_handler(
            State(state),
            Json(InvalidateTagsRequest {
                tags: vec![],
                backend: None,
            }),
        )
        .await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_invalidate_pattern_handler() {
        let state = test_state();

        set_handler(State(state.clone()), Json(set_request("user:1", json!(1))))
            .await
            .unwrap();
        set_handler(State(state.clone()), Json(set_request("store:1", json!(2))))
            .await
            .unwrap();

        let response = invalidate_pattern_handler(
            State(state),
            Json(InvalidatePatternRequest {
                pattern: "^user:".to_string(),
                backend: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.invalidated, 1);
    }

    #[tokio::test]
    async fn test_invalidate_pattern_rejects_bad_regex() {
        let state = test_state();

        let result = invalidate_pattern_handler(
            State(state),
            Json(InvalidatePatternRequest {
                pattern: "(".to_string(),
                backend: None,
            }),
        )
        .await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_clear_handler() {
        let state = test_state();

        set_handler(State(state.clone()), Json(set_request("k", json!(1))))
            .await
            .unwrap();

        let response = clear_handler(State(state.clone()), Query(ClearQuery::default()))
            .await
            .unwrap();
        assert_eq!(response.cleared, vec!["memory".to_string()]);

        let result = get_handler(
            State(state),
            Path("k".to_string()),
            Query(BackendQuery::default()),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = test_state();

        let response = stats_handler(State(state), Query(BackendQuery::default()))
            .await
            .unwrap();
        assert_eq!(response.backend, "memory");
        assert_eq!(response.hit_count, 0);
        assert_eq!(response.miss_count, 0);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }

    #[tokio::test]
    async fn test_set_invalid_request() {
        let state = test_state();

        let result = set_handler(State(state), Json(set_request("", json!(1)))).await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }
}
