//! Upstream call capability
//!
//! Every backend service is represented by a value implementing [`ApiCall`].
//! Loaders only ever see this trait; URL building, transport, retries and
//! response decoding belong to the implementation.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::UpstreamError;

/// HTTP method of an upstream call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// Upper-case method name as sent on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Whether parameters travel in the query string rather than the body
    pub fn uses_query_string(&self) -> bool {
        matches!(self, Self::Get | Self::Delete)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed upstream response envelope
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ApiResponse {
    /// Decoded JSON body (`null` for empty bodies)
    pub body: Value,
    /// Response headers, names lower-cased
    pub headers: BTreeMap<String, String>,
}

impl ApiResponse {
    /// Response with a body and no headers
    pub fn new(body: Value) -> Self {
        Self {
            body,
            headers: BTreeMap::new(),
        }
    }

    /// Add a response header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }
}

/// Correlation identifiers forwarded on every outbound call
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestIds {
    /// Identifier of the incoming request (`X-Request-Id`)
    pub request_id: String,
    /// Original client address chain (`X-Forwarded-For`)
    pub forwarded_for: Option<String>,
}

impl RequestIds {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            forwarded_for: None,
        }
    }

    pub fn with_forwarded_for(mut self, forwarded_for: impl Into<String>) -> Self {
        self.forwarded_for = Some(forwarded_for.into());
        self
    }
}

/// Per-call options handed to [`ApiCall::call`]
///
/// `request_ids` and `user_agent` are always filled in by the loader
/// factory, never by resolvers.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    pub method: HttpMethod,
    /// JSON body for POST/PUT calls
    pub body: Option<Value>,
    pub request_ids: RequestIds,
    pub user_agent: Option<String>,
}

/// Bearer token identifying the principal of an authenticated call
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Stable, non-reversible identity of the token used in loader keys
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        format!("{:x}", digest)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&"[REDACTED]").finish()
    }
}

/// Capability of calling one upstream backend service
#[async_trait]
pub trait ApiCall: Send + Sync + 'static {
    /// Perform one upstream request
    ///
    /// `path` is relative to the backend's base URL and already carries the
    /// query string for GET/DELETE calls. Implementations must return an
    /// error for non-2xx statuses, transport failures and timeouts.
    async fn call(
        &self,
        path: &str,
        token: Option<&str>,
        options: &CallOptions,
    ) -> Result<ApiResponse, UpstreamError>;
}
