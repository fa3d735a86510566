//! Error handling for the Prism API
//!
//! Resolvers surface failures as GraphQL errors. [`ApiError`] classifies
//! them and attaches a machine-readable `extensions.code` (plus the
//! upstream `status` when one is known) so clients can tell a missing
//! session from a failing backend. Resolvers convert through
//! [`graphql_error`](crate::graphql::helpers::graphql_error) rather than
//! `?`, which would fall back to async-graphql's blanket conversion and
//! drop the extensions.

use async_graphql::ErrorExtensions;
use prism_loaders::LoaderError;
use thiserror::Error;

/// Errors returned by GraphQL resolvers
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    /// The field needs an access token and none was sent
    #[error("authentication required")]
    Unauthenticated,

    /// An upstream backend call failed
    #[error("{backend} request failed: {message}")]
    Upstream {
        backend: String,
        status: Option<u16>,
        message: String,
    },

    /// The query arguments could not be turned into a request
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Anything else; details are logged, not returned
    #[error("internal error")]
    Internal(String),
}

impl ApiError {
    /// Error code for client-side handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Upstream { .. } => "UPSTREAM_ERROR",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Upstream HTTP status, if the error came from a backend response
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => *status,
            _ => None,
        }
    }

    /// Whether the upstream reported the resource as missing
    pub fn is_not_found(&self) -> bool {
        self.upstream_status() == Some(404)
    }

    /// Log the error with a severity matching its kind
    pub fn log(&self) {
        match self {
            Self::Internal(details) => {
                tracing::error!(code = self.error_code(), details = %details, "Internal error");
            }
            Self::Upstream { status: Some(status), .. } if *status < 500 => {
                tracing::debug!(error = %self, code = self.error_code(), "Upstream client error");
            }
            Self::Upstream { .. } => {
                tracing::warn!(error = %self, code = self.error_code(), "Upstream failure");
            }
            _ => {
                tracing::debug!(error = %self, code = self.error_code(), "Request error");
            }
        }
    }
}

impl From<LoaderError> for ApiError {
    fn from(e: LoaderError) -> Self {
        match e {
            LoaderError::AuthenticationMissing { .. } => Self::Unauthenticated,
            LoaderError::PathResolution { reason, .. } => Self::BadRequest(reason),
            LoaderError::Upstream { backend, source, .. } => Self::Upstream {
                backend,
                status: source.status(),
                message: source.to_string(),
            },
            LoaderError::ScopeClosed { .. } => Self::Internal(e.to_string()),
        }
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| {
            e.set("code", self.error_code());
            if let Some(status) = self.upstream_status() {
                e.set("status", status);
            }
        })
    }
}

/// Result type for resolvers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use prism_loaders::UpstreamError;
    use tracing_test::traced_test;

    #[test]
    fn test_loader_errors_map_to_codes() {
        let missing = ApiError::from(LoaderError::AuthenticationMissing {
            backend: "gravity".into(),
        });
        assert_eq!(missing.error_code(), "UNAUTHENTICATED");

        let path = ApiError::from(LoaderError::PathResolution {
            backend: "gravity".into(),
            reason: "resolved path is empty".into(),
        });
        assert_matches!(path, ApiError::BadRequest(ref reason) if reason == "resolved path is empty");

        let upstream = ApiError::from(LoaderError::Upstream {
            backend: "positron".into(),
            path: "articles/x".into(),
            source: UpstreamError::Status {
                status: 404,
                message: "Not Found".into(),
            },
        });
        assert_eq!(upstream.error_code(), "UPSTREAM_ERROR");
        assert!(upstream.is_not_found());

        let timeout = ApiError::from(LoaderError::Upstream {
            backend: "positron".into(),
            path: "articles".into(),
            source: UpstreamError::Timeout,
        });
        assert_eq!(timeout.upstream_status(), None);
    }

    #[test]
    fn test_internal_details_are_not_exposed() {
        let error = ApiError::Internal("scope 1234 closed".into());
        assert_eq!(error.to_string(), "internal error");
    }

    #[test]
    fn test_graphql_extensions() {
        let error = ApiError::Upstream {
            backend: "gravity".into(),
            status: Some(502),
            message: "Bad Gateway".into(),
        }
        .extend();

        let extensions = error.extensions.expect("extensions are set");
        assert_eq!(
            extensions.get("code"),
            Some(&async_graphql::Value::from("UPSTREAM_ERROR"))
        );
        assert_eq!(extensions.get("status"), Some(&async_graphql::Value::from(502u16)));
    }

    #[traced_test]
    #[test]
    fn test_log_by_severity() {
        ApiError::Upstream {
            backend: "diffusion".into(),
            status: Some(503),
            message: "Service Unavailable".into(),
        }
        .log();
        assert!(logs_contain("Upstream failure"));

        ApiError::Internal("scope closed".into()).log();
        assert!(logs_contain("Internal error"));
    }
}
