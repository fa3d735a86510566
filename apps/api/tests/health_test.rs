//! Integration tests for health check endpoints

mod common;

use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use common::TestApp;
use prism_loaders::{ApiResponse, CacheError, CacheResult, SharedCache};
use prism_test_utils::MockBackendServer;
use std::sync::Arc;

struct UnavailableCache;

#[async_trait]
impl SharedCache for UnavailableCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<ApiResponse>> {
        Err(CacheError::Backend("connection refused".to_string()))
    }

    async fn set(&self, _key: &str, _value: &ApiResponse, _ttl: Duration) -> CacheResult<()> {
        Err(CacheError::Backend("connection refused".to_string()))
    }
}

#[tokio::test]
async fn test_root_endpoint() {
    let server = MockBackendServer::start().await;
    let (status, body) = TestApp::new(&server).get("/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("Prism"));
}

#[tokio::test]
async fn test_simple_health_check() {
    let server = MockBackendServer::start().await;
    let (status, body) = TestApp::new(&server).get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn test_liveness_probe() {
    let server = MockBackendServer::start().await;
    let (status, body) = TestApp::new(&server).get("/health/live").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "alive");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_readiness_with_memory_cache() {
    let server = MockBackendServer::start().await;
    let (status, body) = TestApp::new(&server).get("/health/ready").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ready");
}

#[tokio::test]
async fn test_readiness_fails_when_cache_is_down() {
    let server = MockBackendServer::start().await;
    let app = TestApp::with_cache(&server, Arc::new(UnavailableCache));
    let (status, body) = app.get("/health/ready").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "unavailable");
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let server = MockBackendServer::start().await;
    let (status, _) = TestApp::new(&server).get("/nonexistent").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
