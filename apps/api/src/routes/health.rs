//! Health check HTTP route handlers
//!
//! - `GET /health` - Simple liveness check (returns 200 OK)
//! - `GET /health/live` - Kubernetes-style liveness probe
//! - `GET /health/ready` - Readiness check (shared cache reachable)

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use prism_loaders::SharedCache;

/// Key read by the readiness probe; never written
const PROBE_KEY: &str = "health:probe";

/// How long the readiness probe waits for the cache
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Shared application state for health check handlers
#[derive(Clone)]
pub struct HealthState {
    cache: Arc<dyn SharedCache>,
}

impl HealthState {
    pub fn new(cache: Arc<dyn SharedCache>) -> Self {
        Self { cache }
    }
}

/// Create health check router
pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/", get(simple_health))
        .route("/live", get(liveness_probe))
        .route("/ready", get(readiness_probe))
        .with_state(state)
}

/// Always returns OK if the server is running
async fn simple_health() -> &'static str {
    "OK"
}

/// Liveness probe; does not touch dependencies
async fn liveness_probe() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness probe
///
/// # Response
/// - 200 OK if the shared cache answers
/// - 503 Service Unavailable otherwise
async fn readiness_probe(State(state): State<HealthState>) -> impl IntoResponse {
    let cache = match tokio::time::timeout(PROBE_TIMEOUT, state.cache.get(PROBE_KEY)).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err("timed out".to_string()),
    };

    match cache {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "ready", "cache": "ok" })),
        ),
        Err(error) => {
            tracing::warn!(error = %error, "Readiness probe: shared cache unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "status": "unavailable", "cache": error })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simple_health() {
        let response = simple_health().await;
        assert_eq!(response, "OK");
    }

    #[tokio::test]
    async fn test_liveness_probe() {
        let response = liveness_probe().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
