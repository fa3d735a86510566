//! Prism API library
//!
//! Exposes the GraphQL gateway components for the binary and for
//! integration tests.

pub mod config;
pub mod error;
pub mod graphql;
pub mod loaders;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};

pub use error::{ApiError, ApiResult};
pub use graphql::{build_schema, PrismSchema, SchemaBuilder};
pub use loaders::{BackendRegistry, Backends, RequestContext, RequestLoaders};

use routes::{graphql_handler, graphql_playground, health_router, HealthState};

/// Build the application router
///
/// Tracing and CORS layers are added by the binary.
pub fn app(schema: PrismSchema, registry: Arc<BackendRegistry>) -> Router {
    let health_state = HealthState::new(registry.shared_layer().cache().clone());

    Router::new()
        .route("/", get(root))
        .route("/graphql", post(graphql_handler))
        .route("/graphql/playground", get(graphql_playground))
        // Nested health routes: /health, /health/live, /health/ready
        .nest("/health", health_router(health_state))
        .layer(Extension(schema))
        .layer(Extension(registry))
}

async fn root() -> &'static str {
    "Prism GraphQL gateway"
}
