//! Integration Tests for API Endpoints
//!
//! Tests the full request/response cycle for each endpoint.

use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use polycache::cache::{CacheService, FileBackend};
use polycache::{api::create_router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> Router {
    let service = CacheService::new(100, Duration::from_secs(300));
    let state = AppState::new(service);
    create_router(state)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn put_set(body: Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri("/set")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// == SET Endpoint Tests ==

#[tokio::test]
async fn test_set_endpoint_success() {
    let app = create_test_app();

    let response = app
        .oneshot(put_set(json!({"key": "test_key", "value": "test_value"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    assert!(body["message"].as_str().unwrap().contains("test_key"));
}

#[tokio::test]
async fn test_set_endpoint_with_options() {
    let app = create_test_app();

    let response = app
        .oneshot(put_set(json!({
            "key": "ttl_key",
            "value": {"id": 7},
            "ttl_ms": 60_000,
            "priority": 5,
            "tags": ["user"]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_set_endpoint_empty_key_is_400() {
    let app = create_test_app();

    let response = app
        .oneshot(put_set(json!({"key": "", "value": 1})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// == GET Endpoint Tests ==

#[tokio::test]
async fn test_get_endpoint_success() {
    let app = create_test_app();

    let set_response = app
        .clone()
        .oneshot(put_set(json!({"key": "get_key", "value": {"count": 3}})))
        .await
        .unwrap();
    assert_eq!(set_response.status(), StatusCode::OK);

    let get_response = app.oneshot(get("/get/get_key")).await.unwrap();

    assert_eq!(get_response.status(), StatusCode::OK);
    let body = body_to_json(get_response.into_body()).await;
    assert_eq!(body["key"], "get_key");
    assert_eq!(body["value"], json!({"count": 3}));
}

#[tokio::test]
async fn test_get_endpoint_not_found() {
    let app = create_test_app();

    let response = app.oneshot(get("/get/nonexistent_key")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_endpoint_expired_key_is_not_found() {
    let app = create_test_app();

    app.clone()
        .oneshot(put_set(json!({"key": "dying", "value": 1, "ttl_ms": 20})))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(30)).await;

    let response = app.oneshot(get("/get/dying")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_endpoint_unknown_backend_is_not_found() {
    let app = create_test_app();

    let response = app.oneshot(get("/get/key?backend=bogus")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_to_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("backend"));
}

// == HAS Endpoint Tests ==

#[tokio::test]
async fn test_has_endpoint() {
    let app = create_test_app();

    app.clone()
        .oneshot(put_set(json!({"key": "peek", "value": 1})))
        .await
        .unwrap();

    let response = app.clone().oneshot(get("/has/peek")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["exists"], json!(true));

    let response = app.oneshot(get("/has/missing")).await.unwrap();
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["exists"], json!(false));
}

#[tokio::test]
async fn test_has_endpoint_does_not_count_requests() {
    let app = create_test_app();

    app.clone().oneshot(get("/has/missing")).await.unwrap();

    let response = app.oneshot(get("/stats")).await.unwrap();
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["hit_count"], json!(0));
    assert_eq!(body["miss_count"], json!(0));
}

// == DELETE Endpoint Tests ==

#[tokio::test]
async fn test_delete_endpoint_success() {
    let app = create_test_app();

    app.clone()
        .oneshot(put_set(json!({"key": "to_delete", "value": 1})))
        .await
        .unwrap();

    let delete_response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/del/to_delete")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(delete_response.status(), StatusCode::OK);

    let get_response = app.oneshot(get("/get/to_delete")).await.unwrap();
    assert_eq!(get_response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_endpoint_not_found() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/del/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// == Invalidation Endpoint Tests ==

#[tokio::test]
async fn test_invalidate_by_tags_endpoint() {
    let app = create_test_app();

    app.clone()
        .oneshot(put_set(
            json!({"key": "a", "value": 1, "tags": ["user"]}),
        ))
        .await
        .unwrap();
    app.clone()
        .oneshot(put_set(json!({"key": "b", "value": 2, "tags": ["api"]})))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post("/invalidate/tags", json!({"tags": ["user"]})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["invalidated"], json!(1));

    assert_eq!(
        app.clone().oneshot(get("/get/a")).await.unwrap().status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.oneshot(get("/get/b")).await.unwrap().status(),
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_invalidate_by_pattern_endpoint() {
    let app = create_test_app();

    for (key, value) in [("user:1", 1), ("user:2", 2), ("store:1", 3)] {
        app.clone()
            .oneshot(put_set(json!({"key": key, "value": value})))
            .await
            .unwrap();
    }

    let response = app
        .clone()
        .oneshot(post("/invalidate/pattern", json!({"pattern": "^user:"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["invalidated"], json!(2));

    assert_eq!(
        app.oneshot(get("/get/store:1")).await.unwrap().status(),
        StatusCode::OK
    );
}

// == Clear Endpoint Tests ==

#[tokio::test]
async fn test_clear_endpoint_is_idempotent() {
    let app = create_test_app();

    app.clone()
        .oneshot(put_set(json!({"key": "k", "value": 1})))
        .await
        .unwrap();

    for _ in 0..2 {
        let response = app.clone().oneshot(post("/clear", json!({}))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.oneshot(get("/stats")).await.unwrap();
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["total_entries"], json!(0));
}

// == Stats Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint_tracks_requests() {
    let app = create_test_app();

    app.clone()
        .oneshot(put_set(json!({"key": "k", "value": "v"})))
        .await
        .unwrap();
    app.clone().oneshot(get("/get/k")).await.unwrap();
    app.clone().oneshot(get("/get/missing")).await.unwrap();

    let response = app.oneshot(get("/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["backend"], "memory");
    assert_eq!(body["total_entries"], json!(1));
    assert_eq!(body["hit_count"], json!(1));
    assert_eq!(body["miss_count"], json!(1));
    assert_eq!(body["hit_rate"], json!(0.5));
}

// == Persistent Backend Tests ==

#[tokio::test]
async fn test_disk_backend_roundtrip_through_api() {
    let dir = tempfile::tempdir().unwrap();
    let mut service = CacheService::new(100, Duration::from_secs(300));
    service.register_backend(
        "disk",
        Box::new(FileBackend::new(dir.path().join("cache.json"))),
    );
    let app = create_router(AppState::new(service));

    let response = app
        .clone()
        .oneshot(put_set(
            json!({"key": "k", "value": "stored", "backend": "disk"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Present on disk, absent from the default memory backend
    let response = app.clone().oneshot(get("/get/k?backend=disk")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["value"], json!("stored"));

    let response = app.oneshot(get("/get/k")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// == Health Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["status"], "healthy");
}
