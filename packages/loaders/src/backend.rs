//! Backend service registration

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::api::{AccessToken, ApiCall, ApiResponse, CallOptions, HttpMethod};
use crate::error::{LoaderError, LoaderResult};
use crate::throttle::Throttle;

/// Shared cache TTL used when a backend does not configure one
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Base delay for exponential backoff between attempts (milliseconds)
const RETRY_BASE_DELAY_MS: u64 = 100;

/// One upstream service as seen by loader factories
///
/// Holds the service's [`ApiCall`] capability together with the policies
/// that apply to every call made to it: an optional [`Throttle`], how often
/// transient GET failures are retried, and the TTL of entries it writes into
/// the shared cache. A `Backend` is built once per
/// process and shared (behind an `Arc`) by every factory using it, which is
/// what makes its throttle process-wide.
pub struct Backend {
    name: String,
    api: Arc<dyn ApiCall>,
    throttle: Option<Throttle>,
    max_retries: u32,
    cache_ttl: Duration,
}

impl Backend {
    pub fn new(name: impl Into<String>, api: Arc<dyn ApiCall>) -> Self {
        Self {
            name: name.into(),
            api,
            throttle: None,
            max_retries: 0,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }

    /// Space outbound calls to this backend by at least the throttle interval
    pub fn with_throttle(mut self, throttle: Throttle) -> Self {
        self.throttle = Some(throttle);
        self
    }

    /// Retry retryable GET failures up to `max_retries` times
    ///
    /// Every attempt waits for the throttle like a fresh call.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// TTL for shared cache entries written for this backend
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    pub fn throttle(&self) -> Option<&Throttle> {
        self.throttle.as_ref()
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Perform one upstream call
    ///
    /// Each attempt, retries included, first waits for the throttle. Only
    /// GET calls are retried, and only on retryable failures.
    pub(crate) async fn fetch(
        &self,
        path: &str,
        token: Option<&AccessToken>,
        options: &CallOptions,
    ) -> LoaderResult<ApiResponse> {
        let retry = options.method == HttpMethod::Get;
        let mut attempt = 0;

        loop {
            if let Some(throttle) = &self.throttle {
                throttle.ready().await;
            }

            debug!(
                backend = %self.name,
                method = %options.method,
                path = %path,
                attempt,
                "Calling upstream"
            );

            match self.api.call(path, token.map(AccessToken::as_str), options).await {
                Ok(response) => return Ok(response),
                Err(e) if retry && e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay_ms = RETRY_BASE_DELAY_MS * 2u64.pow(attempt);
                    warn!(
                        backend = %self.name,
                        attempt = attempt,
                        max_retries = self.max_retries,
                        delay_ms = delay_ms,
                        error = %e,
                        "Upstream request failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                Err(source) => {
                    return Err(LoaderError::Upstream {
                        backend: self.name.clone(),
                        path: path.to_string(),
                        source,
                    })
                }
            }
        }
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend")
            .field("name", &self.name)
            .field("throttle", &self.throttle.as_ref().map(Throttle::interval))
            .field("max_retries", &self.max_retries)
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}
