//! Upstream client construction errors

use thiserror::Error;

/// Errors raised while building an [`HttpBackendClient`](crate::HttpBackendClient)
///
/// Request failures are reported as `prism_loaders::UpstreamError` instead.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Base URL could not be parsed or is not http(s)
    #[error("Invalid base URL for {backend}: {reason}")]
    InvalidBaseUrl { backend: String, reason: String },

    /// Token header name is not a valid HTTP header name
    #[error("Invalid token header '{0}'")]
    InvalidTokenHeader(String),

    /// The underlying HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type for client construction
pub type ClientResult<T> = Result<T, ClientError>;
