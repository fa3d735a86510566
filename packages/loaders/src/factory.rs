//! Loader factories
//!
//! A [`LoaderFactory`] binds one [`Backend`] to a caching strategy and to
//! the [`GlobalParams`] of the current request. It comes in two variants:
//!
//! - **without authentication**: calls carry no token and go through the
//!   process-wide [`SharedCacheLayer`], so responses are reused across
//!   requests until their TTL runs out;
//! - **with authentication**: calls carry the caller's [`AccessToken`] and
//!   are memoized only in the [`RequestScope`] of the current query
//!   execution.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::api::{AccessToken, ApiResponse, CallOptions, HttpMethod, RequestIds};
use crate::backend::Backend;
use crate::error::{LoaderError, LoaderResult};
use crate::key::{path_with_query, LoaderKey, Params};
use crate::loader::{Body, DynamicPath, LoaderBuilder, StaticPath};
use crate::path::{validate_path, PathGenerator};
use crate::scope::RequestScope;
use crate::shared::{CachePolicy, SharedCacheLayer};

/// Values attached by the factory to every outbound call of one request
#[derive(Debug, Clone, Default)]
pub struct GlobalParams {
    pub request_ids: RequestIds,
    pub user_agent: Option<String>,
}

impl GlobalParams {
    pub fn new(request_ids: RequestIds) -> Self {
        Self {
            request_ids,
            user_agent: None,
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

enum Strategy {
    Shared(Arc<SharedCacheLayer>),
    Scoped {
        scope: Arc<RequestScope>,
        token: Option<AccessToken>,
    },
}

struct Inner {
    backend: Arc<Backend>,
    strategy: Strategy,
    globals: GlobalParams,
}

/// Produces loaders for one backend service
///
/// Cloning is cheap; clones share the same backend, strategy and globals.
#[derive(Clone)]
pub struct LoaderFactory {
    inner: Arc<Inner>,
}

impl LoaderFactory {
    /// Factory whose loaders share responses across requests
    ///
    /// Only use this for backends serving data that does not depend on who
    /// is asking.
    pub fn without_authentication(
        backend: Arc<Backend>,
        shared: Arc<SharedCacheLayer>,
        globals: GlobalParams,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                strategy: Strategy::Shared(shared),
                globals,
            }),
        }
    }

    /// Factory whose loaders act on behalf of `token` within `scope`
    ///
    /// Loaders built from a factory without a token fail with
    /// [`LoaderError::AuthenticationMissing`] when invoked.
    pub fn with_authentication(
        backend: Arc<Backend>,
        scope: Arc<RequestScope>,
        token: Option<AccessToken>,
        globals: GlobalParams,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                strategy: Strategy::Scoped { scope, token },
                globals,
            }),
        }
    }

    pub fn backend_name(&self) -> &str {
        self.inner.backend.name()
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.inner.strategy, Strategy::Scoped { .. })
    }

    /// Start building a loader for a literal path
    pub fn path(&self, path: impl Into<String>) -> LoaderBuilder<StaticPath, Body> {
        LoaderBuilder::new(self.clone(), StaticPath(path.into()))
    }

    /// Start building a loader whose path is generated per call
    pub fn dynamic<P, G>(&self, generator: G) -> LoaderBuilder<DynamicPath<P>, Body>
    where
        P: 'static,
        G: PathGenerator<P>,
    {
        LoaderBuilder::new(
            self.clone(),
            DynamicPath {
                generator: Arc::new(generator),
            },
        )
    }

    /// Resolve, deduplicate and perform one call
    pub(crate) async fn load(
        &self,
        resolved: Result<String, String>,
        method: HttpMethod,
        params: Params,
    ) -> LoaderResult<ApiResponse> {
        let inner = &self.inner;
        let backend_name = inner.backend.name();

        let token = match &inner.strategy {
            Strategy::Scoped { token: None, .. } => {
                return Err(LoaderError::AuthenticationMissing {
                    backend: backend_name.to_string(),
                });
            }
            Strategy::Scoped { token, .. } => token.clone(),
            Strategy::Shared(_) => None,
        };

        let path = resolved
            .and_then(|path| validate_path(&path).map(|()| path))
            .map_err(|reason| LoaderError::PathResolution {
                backend: backend_name.to_string(),
                reason,
            })?;

        let key = LoaderKey::new(backend_name, method, &path, &params, token.as_ref());

        let (call_path, body) = if method.uses_query_string() {
            (path_with_query(&path, &params), None)
        } else if params.is_empty() {
            (path, None)
        } else {
            (path, Some(Value::Object(params)))
        };

        let options = CallOptions {
            method,
            body,
            request_ids: inner.globals.request_ids.clone(),
            user_agent: inner.globals.user_agent.clone(),
        };

        let backend = Arc::clone(&inner.backend);
        let fetch = move || async move { backend.fetch(&call_path, token.as_ref(), &options).await };

        match &inner.strategy {
            Strategy::Shared(layer) => {
                let policy = if method == HttpMethod::Get {
                    CachePolicy::Store {
                        ttl: inner.backend.cache_ttl(),
                    }
                } else {
                    CachePolicy::Bypass
                };
                layer.load(key, policy, fetch).await
            }
            Strategy::Scoped { scope, .. } => scope.get_or_create(key, fetch).await,
        }
    }
}

impl fmt::Debug for LoaderFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let strategy = match &self.inner.strategy {
            Strategy::Shared(_) => "shared",
            Strategy::Scoped { .. } => "request-scoped",
        };
        f.debug_struct("LoaderFactory")
            .field("backend", &self.backend_name())
            .field("strategy", &strategy)
            .field("request_id", &self.inner.globals.request_ids.request_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiCall;
    use crate::cache::MemoryCache;
    use crate::error::UpstreamError;
    use crate::key::params;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records each call's path and options
    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(String, Option<String>, CallOptions)>>,
    }

    #[async_trait]
    impl ApiCall for Recorder {
        async fn call(
            &self,
            path: &str,
            token: Option<&str>,
            options: &CallOptions,
        ) -> Result<ApiResponse, UpstreamError> {
            self.calls
                .lock()
                .unwrap()
                .push((path.to_string(), token.map(str::to_string), options.clone()));
            Ok(ApiResponse::new(json!({ "path": path })))
        }
    }

    fn globals() -> GlobalParams {
        GlobalParams::new(RequestIds::new("req-1").with_forwarded_for("10.0.0.1"))
            .with_user_agent("prism-test/1.0")
    }

    fn shared_factory(api: Arc<Recorder>) -> LoaderFactory {
        let backend = Arc::new(Backend::new("gravity", api));
        let layer = Arc::new(SharedCacheLayer::new(Arc::new(MemoryCache::new())));
        LoaderFactory::without_authentication(backend, layer, globals())
    }

    #[tokio::test]
    async fn test_get_params_go_in_query_string() {
        let api = Arc::new(Recorder::default());
        let factory = shared_factory(api.clone());
        let loader = factory.path("artworks").param("size", 10).build();

        loader.load_with(params(json!({"sort": "-date"}))).await.unwrap();

        let calls = api.calls.lock().unwrap();
        assert_eq!(calls[0].0, "artworks?size=10&sort=-date");
        assert_eq!(calls[0].1, None);
        assert!(calls[0].2.body.is_none());
    }

    #[tokio::test]
    async fn test_post_params_go_in_body() {
        let api = Arc::new(Recorder::default());
        let backend = Arc::new(Backend::new("convection", api.clone()));
        let factory = LoaderFactory::with_authentication(
            backend,
            RequestScope::new(),
            Some(AccessToken::new("secret")),
            globals(),
        );
        let loader = factory
            .path("submissions")
            .method(HttpMethod::Post)
            .param("artist_id", "banksy")
            .build();

        loader.load().await.unwrap();

        let calls = api.calls.lock().unwrap();
        assert_eq!(calls[0].0, "submissions");
        assert_eq!(calls[0].1.as_deref(), Some("secret"));
        assert_eq!(calls[0].2.method, HttpMethod::Post);
        assert_eq!(calls[0].2.body, Some(json!({"artist_id": "banksy"})));
    }

    #[tokio::test]
    async fn test_globals_are_attached() {
        let api = Arc::new(Recorder::default());
        let factory = shared_factory(api.clone());

        factory.path("system/up").build().load().await.unwrap();

        let calls = api.calls.lock().unwrap();
        let options = &calls[0].2;
        assert_eq!(options.request_ids.request_id, "req-1");
        assert_eq!(options.request_ids.forwarded_for.as_deref(), Some("10.0.0.1"));
        assert_eq!(options.user_agent.as_deref(), Some("prism-test/1.0"));
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_network() {
        let api = Arc::new(Recorder::default());
        let backend = Arc::new(Backend::new("impulse", api.clone()));
        let factory = LoaderFactory::with_authentication(backend, RequestScope::new(), None, globals());

        let result = factory.path("conversations").build().load().await;

        assert_matches!(result, Err(LoaderError::AuthenticationMissing { backend }) if backend == "impulse");
        assert!(api.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_generated_path_fails_before_network() {
        let api = Arc::new(Recorder::default());
        let factory = shared_factory(api.clone());
        let loader = factory.dynamic(|id: &String| format!("artist/{}", id)).build();

        let result = loader.load(&"has space".to_string()).await;

        assert_matches!(result, Err(LoaderError::PathResolution { backend, .. }) if backend == "gravity");
        assert!(api.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_debug_names_strategy() {
        let factory = shared_factory(Arc::new(Recorder::default()));
        let debug = format!("{:?}", factory);
        assert!(debug.contains("gravity"));
        assert!(debug.contains("shared"));
        assert!(!factory.is_authenticated());
    }
}
