//! Shared cross-request cache layer
//!
//! Process-wide companion of the without-authentication factories. Every
//! factory built for any request points at the same [`SharedCacheLayer`], so
//! a resource requested by many concurrent queries is fetched once and then
//! served from the [`SharedCache`] until its TTL runs out.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::api::ApiResponse;
use crate::cache::SharedCache;
use crate::error::LoaderResult;
use crate::inflight::{InFlight, Retention};
use crate::key::LoaderKey;

/// Whether a deduplicated call may read and write the shared cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CachePolicy {
    /// Serve from and store into the cache with this TTL
    Store { ttl: Duration },
    /// Never touch the cache (non-GET calls)
    Bypass,
}

pub struct SharedCacheLayer {
    cache: Arc<dyn SharedCache>,
    in_flight: InFlight<ApiResponse>,
}

impl SharedCacheLayer {
    pub fn new(cache: Arc<dyn SharedCache>) -> Self {
        Self {
            cache,
            in_flight: InFlight::new(Retention::DropSettled),
        }
    }

    /// Backing store
    pub fn cache(&self) -> &Arc<dyn SharedCache> {
        &self.cache
    }

    /// Number of fetches currently in flight
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Resolve `key` from the shared cache, or through `fetch` on a miss
    ///
    /// The cache lookup, the fetch and the cache write run as one
    /// deduplicated operation: concurrent callers for the same key wait on
    /// it instead of racing the lookup. Only successful responses are
    /// written. Store failures are logged and treated as a miss or a
    /// skipped write. With [`CachePolicy::Bypass`] the call is only
    /// deduplicated.
    pub(crate) async fn load<F, Fut>(
        &self,
        key: LoaderKey,
        policy: CachePolicy,
        fetch: F,
    ) -> LoaderResult<ApiResponse>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = LoaderResult<ApiResponse>> + Send + 'static,
    {
        let cache = Arc::clone(&self.cache);
        let cache_key = key.clone();

        self.in_flight
            .join(key, move || {
                let operation = fetch();
                async move {
                    let CachePolicy::Store { ttl } = policy else {
                        return operation.await;
                    };

                    match cache.get(cache_key.as_str()).await {
                        Ok(Some(hit)) => {
                            debug!(key = %cache_key, "Shared cache hit");
                            return Ok(hit);
                        }
                        Ok(None) => debug!(key = %cache_key, "Shared cache miss"),
                        Err(e) => {
                            warn!(key = %cache_key, error = %e, "Shared cache read failed, fetching upstream")
                        }
                    }

                    let response = operation.await?;

                    if let Err(e) = cache.set(cache_key.as_str(), &response, ttl).await {
                        warn!(key = %cache_key, error = %e, "Shared cache write failed");
                    }
                    Ok(response)
                }
            })
            .await
    }
}

impl fmt::Debug for SharedCacheLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedCacheLayer")
            .field("in_flight", &self.in_flight())
            .finish()
    }
}
