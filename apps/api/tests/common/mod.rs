//! Common test utilities for API integration tests
//!
//! Builds the real router against mock upstream backends.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use prism_api::loaders::{backend_from_config, BackendRegistry, Backends};
use prism_api::{app, build_schema};
use prism_loaders::{MemoryCache, SharedCache};
use prism_shared_config::BackendConfig;
use prism_test_utils::MockBackendServer;
use prism_upstream_client::HttpBackendClient;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Backends that all point at `server`, without retries
pub fn backends_for(server: &MockBackendServer) -> Backends {
    let build = |name: &str| {
        let mut config = BackendConfig::new(name, server.url());
        config.max_retries = 0;
        let client = HttpBackendClient::from_config(&config).unwrap();
        Arc::new(backend_from_config(&config, Arc::new(client)))
    };

    Backends {
        convection: build("convection"),
        delta: build("delta"),
        diffusion: build("diffusion"),
        galaxy: build("galaxy"),
        gravity: build("gravity"),
        impulse: build("impulse"),
        positron: build("positron"),
    }
}

/// Test application wired to a mock upstream
pub struct TestApp {
    pub router: Router,
    pub registry: Arc<BackendRegistry>,
}

impl TestApp {
    pub fn new(server: &MockBackendServer) -> Self {
        Self::with_cache(server, Arc::new(MemoryCache::new()))
    }

    pub fn with_cache(server: &MockBackendServer, cache: Arc<dyn SharedCache>) -> Self {
        let registry = Arc::new(BackendRegistry::new(backends_for(server), cache, "Prism/test"));
        let router = app(build_schema(), registry.clone());
        Self { router, registry }
    }

    /// POST a GraphQL query, optionally with a bearer token
    pub async fn graphql(&self, query: &str, token: Option<&str>) -> Value {
        let mut request = Request::builder()
            .method("POST")
            .uri("/graphql")
            .header("content-type", "application/json")
            .header("x-request-id", "test-request");
        if let Some(token) = token {
            request = request.header("authorization", format!("Bearer {}", token));
        }
        let request = request
            .body(Body::from(json!({ "query": query }).to_string()))
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response.into_body()).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = self
            .router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }
}

pub async fn body_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// `extensions.code` of the first GraphQL error
pub fn first_error_code(response: &Value) -> Option<&str> {
    response["errors"][0]["extensions"]["code"].as_str()
}
