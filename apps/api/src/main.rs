use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderName, Method};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use prism_api::config::Config;
use prism_api::loaders::{connect_shared_cache, BackendRegistry, Backends};
use prism_api::{app, SchemaBuilder};

/// Build the CORS layer based on configuration.
///
/// In production mode:
/// - If `CORS_ORIGINS` is set, only those origins are allowed
/// - If `CORS_ORIGINS` is not set, CORS requests are rejected (no origins allowed)
///
/// In development mode:
/// - If `CORS_ORIGINS` is set, those origins are used
/// - If `CORS_ORIGINS` is not set, permissive CORS is used for convenience
fn build_cors_layer(config: &Config) -> CorsLayer {
    match &config.cors_allowed_origins {
        Some(origins) if !origins.is_empty() => {
            let allowed_origins: Vec<_> = origins
                .iter()
                .filter_map(|origin| {
                    origin.parse().ok().or_else(|| {
                        tracing::warn!("Invalid CORS origin '{}', skipping", origin);
                        None
                    })
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::error!("No valid CORS origins configured, CORS requests will be rejected");
                CorsLayer::new()
            } else {
                tracing::info!(
                    "CORS configured with {} allowed origin(s): {:?}",
                    allowed_origins.len(),
                    origins
                );
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([
                        header::AUTHORIZATION,
                        header::CONTENT_TYPE,
                        header::ACCEPT,
                        header::ORIGIN,
                        HeaderName::from_static("x-request-id"),
                    ])
                    .allow_credentials(true)
                    .max_age(std::time::Duration::from_secs(3600))
            }
        }
        _ if config.is_production() => {
            tracing::warn!(
                "CORS_ORIGINS not configured in production mode. \
                 CORS requests will be rejected. Set CORS_ORIGINS to allow cross-origin requests."
            );
            CorsLayer::new()
        }
        _ => {
            tracing::warn!(
                "Using permissive CORS in development mode. \
                 Set CORS_ORIGINS for production-like behavior."
            );
            CorsLayer::permissive()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "prism_api=debug,prism_loaders=debug,prism_upstream_client=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    tracing::info!(
        environment = ?config.environment(),
        "Starting Prism API server on port {}",
        config.port
    );

    let backends = Backends::from_config(&config.common)?;
    for backend in [
        &backends.convection,
        &backends.delta,
        &backends.diffusion,
        &backends.galaxy,
        &backends.gravity,
        &backends.impulse,
        &backends.positron,
    ] {
        tracing::info!(
            backend = backend.name(),
            cache_ttl_secs = backend.cache_ttl().as_secs(),
            throttle_ms = backend.throttle().map(|t| t.interval().as_millis() as u64),
            max_retries = backend.max_retries(),
            "Backend configured"
        );
    }

    let cache = connect_shared_cache(config.common.cache.backend, config.redis()).await;
    let registry = Arc::new(BackendRegistry::new(backends, cache, config.user_agent.clone()));

    let mut schema = SchemaBuilder::new();
    if config.is_production() {
        schema = schema.disable_introspection();
    }
    let schema = schema.build();
    tracing::info!("GraphQL schema built");

    let cors_layer = build_cors_layer(&config);

    let app = app(schema, registry)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer);

    // Run the server with ConnectInfo to capture client addresses
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on {}", addr);
    tracing::info!(
        "GraphQL Playground available at http://{}:{}/graphql/playground",
        addr.ip(),
        addr.port()
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
