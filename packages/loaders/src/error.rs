//! Loader error types

use thiserror::Error;
use uuid::Uuid;

/// Failure reported by an [`ApiCall`](crate::ApiCall) implementation
///
/// Errors are cloned to every waiter of a deduplicated fetch, so every
/// variant carries owned, cheaply clonable data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// Upstream answered with a non-2xx status
    #[error("upstream responded with status {status}: {message}")]
    Status { status: u16, message: String },

    /// Request did not complete within the client timeout
    #[error("upstream request timed out")]
    Timeout,

    /// Connection or protocol failure before a response was received
    #[error("transport error: {0}")]
    Transport(String),

    /// Response body was not valid JSON
    #[error("invalid upstream response body: {0}")]
    Decode(String),
}

impl UpstreamError {
    /// Check if this error is a transient failure worth retrying
    ///
    /// Retries on timeouts, transport errors, 429 and 5xx responses.
    /// Other client errors are final.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::Transport(_) => true,
            Self::Status { status, .. } => *status == 429 || (500..600).contains(status),
            Self::Decode(_) => false,
        }
    }

    /// HTTP status of the upstream response, if one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors surfaced by loaders to resolvers
#[derive(Error, Debug, Clone)]
pub enum LoaderError {
    /// The upstream call failed; never cached
    #[error("{backend} request for {path} failed: {source}")]
    Upstream {
        backend: String,
        path: String,
        #[source]
        source: UpstreamError,
    },

    /// An authenticated loader was invoked without an access token
    #[error("{backend} loader requires an access token")]
    AuthenticationMissing { backend: String },

    /// The path generator failed or produced an unusable path
    #[error("could not resolve {backend} path: {reason}")]
    PathResolution { backend: String, reason: String },

    /// The owning request scope was already torn down
    #[error("request scope {scope} is closed")]
    ScopeClosed { scope: Uuid },
}

impl LoaderError {
    /// Underlying upstream failure, if any
    pub fn upstream(&self) -> Option<&UpstreamError> {
        match self {
            Self::Upstream { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type for loader operations
pub type LoaderResult<T> = Result<T, LoaderError>;

/// Errors raised by shared cache stores
///
/// These never reach loader callers: a failing store degrades to a cache
/// miss or a skipped write.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The store itself failed (connection, command error)
    #[error("cache store error: {0}")]
    Backend(String),

    /// A stored value could not be encoded or decoded
    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<redis::RedisError> for CacheError {
    fn from(e: redis::RedisError) -> Self {
        Self::Backend(e.to_string())
    }
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;
