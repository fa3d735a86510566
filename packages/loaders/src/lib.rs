//! Upstream data loaders for Prism
//!
//! This crate turns "fetch resource X from backend service S" into a
//! deduplicated, optionally cached, optionally authenticated call:
//! - Concurrent loads of the same resource share one upstream request
//! - Unauthenticated responses are reused across requests via a shared cache
//! - Authenticated responses are memoized per query execution only
//! - Outbound calls to a backend can be throttled
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use prism_loaders::{
//!     params, Backend, GlobalParams, LoaderFactory, MemoryCache, RequestIds, SharedCacheLayer,
//! };
//! # use prism_loaders::ApiCall;
//!
//! # async fn example(gravity_api: Arc<dyn ApiCall>) -> Result<(), Box<dyn std::error::Error>> {
//! let gravity = Arc::new(Backend::new("gravity", gravity_api));
//! let shared = Arc::new(SharedCacheLayer::new(Arc::new(MemoryCache::new())));
//!
//! // One factory per incoming request
//! let globals = GlobalParams::new(RequestIds::new("request-id"));
//! let factory = LoaderFactory::without_authentication(gravity, shared, globals);
//!
//! let artist = factory.dynamic(|id: &String| format!("artist/{}", id)).build();
//! let banksy = artist.load(&"banksy".to_string()).await?;
//!
//! let artworks = factory.path("artworks").param("size", 10).build();
//! let recent = artworks.load_with(params(serde_json::json!({"sort": "-date"}))).await?;
//! # let _ = (banksy, recent);
//! # Ok(())
//! # }
//! ```

mod api;
mod backend;
pub mod cache;
mod error;
mod factory;
mod inflight;
mod key;
mod loader;
mod path;
mod scope;
mod shared;
mod throttle;

pub use api::{AccessToken, ApiCall, ApiResponse, CallOptions, HttpMethod, RequestIds};
pub use backend::{Backend, DEFAULT_CACHE_TTL};
pub use cache::{MemoryCache, RedisCache, SharedCache};
pub use error::{CacheError, CacheResult, LoaderError, LoaderResult, UpstreamError};
pub use factory::{GlobalParams, LoaderFactory};
pub use key::{encode_query, merge_params, params, path_with_query, LoaderKey, Params};
pub use loader::{
    Body, BodyAndHeaders, DynamicPath, DynamicPathLoader, LoaderBuilder, ResponseShape, StaticPath,
    StaticPathLoader,
};
pub use path::{try_path, validate_path, FalliblePath, PathGenerator};
pub use scope::{RequestScope, ScopeGuard};
pub use shared::SharedCacheLayer;
pub use throttle::Throttle;
