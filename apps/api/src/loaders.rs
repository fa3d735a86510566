//! Loader composition root
//!
//! [`BackendRegistry`] is built once at startup. It owns one [`Backend`]
//! per upstream service (HTTP client, throttle, retries, cache TTL) and the
//! process-wide [`SharedCacheLayer`]. For every query execution it hands
//! out a [`RequestLoaders`] holding the named factories resolvers use.
//!
//! Unauthenticated factories (delta, diffusion, galaxy, gravity, positron)
//! cache responses across requests. Authenticated factories (convection,
//! gravity, impulse) only memoize within the current query execution; never
//! use an unauthenticated factory for principal-scoped data.

use std::sync::Arc;
use std::time::Duration;

use prism_loaders::{
    AccessToken, Backend, GlobalParams, LoaderFactory, MemoryCache, RedisCache, RequestIds,
    RequestScope, ScopeGuard, SharedCache, SharedCacheLayer, Throttle,
};
use prism_shared_config::{BackendConfig, CacheBackend, CommonConfig, ConfigError, RedisConfig};
use prism_upstream_client::{ClientError, HttpBackendClient};
use thiserror::Error;

/// Errors raised while assembling the registry
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// One [`Backend`] per upstream service
#[derive(Debug, Clone)]
pub struct Backends {
    pub convection: Arc<Backend>,
    pub delta: Arc<Backend>,
    pub diffusion: Arc<Backend>,
    pub galaxy: Arc<Backend>,
    pub gravity: Arc<Backend>,
    pub impulse: Arc<Backend>,
    pub positron: Arc<Backend>,
}

impl Backends {
    /// Build HTTP-backed services from configuration
    pub fn from_config(config: &CommonConfig) -> Result<Self, RegistryError> {
        let build = |name: &str| -> Result<Arc<Backend>, RegistryError> {
            let backend_config = config.backend(name)?;
            let client = HttpBackendClient::from_config(backend_config)?;
            Ok(Arc::new(backend_from_config(backend_config, Arc::new(client))))
        };

        Ok(Self {
            convection: build("convection")?,
            delta: build("delta")?,
            diffusion: build("diffusion")?,
            galaxy: build("galaxy")?,
            gravity: build("gravity")?,
            impulse: build("impulse")?,
            positron: build("positron")?,
        })
    }
}

/// Apply the throttle, retry and TTL policies of `config` to an API client
pub fn backend_from_config(config: &BackendConfig, api: Arc<dyn prism_loaders::ApiCall>) -> Backend {
    let backend = Backend::new(config.name.clone(), api)
        .with_cache_ttl(Duration::from_secs(config.cache_ttl_secs))
        .with_max_retries(config.max_retries);
    match config.request_throttle_ms {
        Some(interval_ms) => backend.with_throttle(Throttle::from_millis(interval_ms)),
        None => backend,
    }
}

/// Open the configured shared cache store
///
/// Falls back to the in-memory store when Redis is selected but cannot be
/// reached, so the gateway still starts (with per-instance caching only).
pub async fn connect_shared_cache(cache: CacheBackend, redis: &RedisConfig) -> Arc<dyn SharedCache> {
    if cache == CacheBackend::Memory {
        tracing::info!("Using in-memory shared loader cache");
        return Arc::new(MemoryCache::new());
    }

    let store = match RedisCache::open(&redis.connection_url(), redis.key_prefix.clone()) {
        Ok(store) => store,
        Err(e) => {
            tracing::warn!(error = %e, "Redis client creation failed, using in-memory loader cache");
            return Arc::new(MemoryCache::new());
        }
    };

    let timeout = Duration::from_secs(redis.connect_timeout_secs);
    match tokio::time::timeout(timeout, store.ping()).await {
        Ok(Ok(())) => {
            tracing::info!("Redis connected for shared loader cache");
            Arc::new(store)
        }
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Redis ping failed, using in-memory loader cache");
            Arc::new(MemoryCache::new())
        }
        Err(_) => {
            tracing::warn!(timeout_secs = redis.connect_timeout_secs, "Redis connection timed out, using in-memory loader cache");
            Arc::new(MemoryCache::new())
        }
    }
}

/// Identity of one incoming request, as seen by upstream calls
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub request_ids: RequestIds,
    pub user_agent: Option<String>,
    pub access_token: Option<AccessToken>,
}

/// Process-wide loader state
pub struct BackendRegistry {
    backends: Backends,
    shared: Arc<SharedCacheLayer>,
    default_user_agent: String,
}

impl BackendRegistry {
    pub fn new(backends: Backends, cache: Arc<dyn SharedCache>, default_user_agent: impl Into<String>) -> Self {
        Self {
            backends,
            shared: Arc::new(SharedCacheLayer::new(cache)),
            default_user_agent: default_user_agent.into(),
        }
    }

    pub fn backends(&self) -> &Backends {
        &self.backends
    }

    pub fn shared_layer(&self) -> &Arc<SharedCacheLayer> {
        &self.shared
    }

    /// Open a request scope and build the factories for one query execution
    pub fn request_loaders(&self, context: RequestContext) -> RequestLoaders {
        let scope = RequestScope::new();
        let globals = GlobalParams {
            request_ids: context.request_ids,
            user_agent: Some(
                context
                    .user_agent
                    .unwrap_or_else(|| self.default_user_agent.clone()),
            ),
        };
        let token = context.access_token;

        let without_auth = |backend: &Arc<Backend>| {
            LoaderFactory::without_authentication(backend.clone(), self.shared.clone(), globals.clone())
        };
        let with_auth = |backend: &Arc<Backend>| {
            LoaderFactory::with_authentication(backend.clone(), scope.clone(), token.clone(), globals.clone())
        };

        RequestLoaders {
            delta: without_auth(&self.backends.delta),
            diffusion: without_auth(&self.backends.diffusion),
            galaxy: without_auth(&self.backends.galaxy),
            gravity: without_auth(&self.backends.gravity),
            positron: without_auth(&self.backends.positron),
            convection_with_auth: with_auth(&self.backends.convection),
            gravity_with_auth: with_auth(&self.backends.gravity),
            impulse_with_auth: with_auth(&self.backends.impulse),
            is_authenticated: token.is_some(),
            guard: Arc::new(scope.guard()),
        }
    }
}

/// Named loader factories for one query execution
///
/// Cloned into the GraphQL context. The request scope is closed once the
/// last clone is dropped.
#[derive(Clone)]
pub struct RequestLoaders {
    /// Cached across requests
    pub delta: LoaderFactory,
    /// Cached across requests; throttled per `DIFFUSION_REQUEST_THROTTLE_MS`
    pub diffusion: LoaderFactory,
    /// Cached across requests
    pub galaxy: LoaderFactory,
    /// Cached across requests; do not use for authenticated requests
    pub gravity: LoaderFactory,
    /// Cached across requests
    pub positron: LoaderFactory,
    /// Cached for the duration of the query execution only
    pub convection_with_auth: LoaderFactory,
    /// Cached for the duration of the query execution only
    pub gravity_with_auth: LoaderFactory,
    /// Cached for the duration of the query execution only
    pub impulse_with_auth: LoaderFactory,
    is_authenticated: bool,
    guard: Arc<ScopeGuard>,
}

impl RequestLoaders {
    /// Whether the request carried an access token
    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn scope(&self) -> &Arc<RequestScope> {
        self.guard.scope()
    }
}
