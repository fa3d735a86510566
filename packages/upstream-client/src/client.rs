//! HTTP client for one upstream backend service

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use prism_loaders::{ApiCall, ApiResponse, CallOptions, HttpMethod, UpstreamError};
use prism_shared_config::BackendConfig;
use reqwest::header::{HeaderMap, HeaderName, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::error::{ClientError, ClientResult};

/// Default connection timeout in seconds
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Longest upstream error body kept in error messages
const MAX_ERROR_MESSAGE_LENGTH: usize = 512;

/// Fallback `User-Agent` when a call does not carry one
const DEFAULT_USER_AGENT: &str = concat!("Prism/", env!("CARGO_PKG_VERSION"));

/// [`ApiCall`] implementation speaking JSON over HTTP
///
/// Makes exactly one request per call. Retries and throttling are policies
/// of the owning [`Backend`](prism_loaders::Backend).
#[derive(Clone)]
pub struct HttpBackendClient {
    http_client: Client,
    name: String,
    base_url: Url,
    token_header: Option<HeaderName>,
}

impl fmt::Debug for HttpBackendClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpBackendClient")
            .field("name", &self.name)
            .field("base_url", &self.base_url.as_str())
            .field("token_header", &self.token_header)
            .finish()
    }
}

impl HttpBackendClient {
    /// Create a client for the backend described by `config`
    ///
    /// # Errors
    /// - `ClientError::InvalidBaseUrl` if the base URL is not an http(s) URL
    /// - `ClientError::InvalidTokenHeader` if the token header name is invalid
    /// - `ClientError::Http` if the HTTP client cannot be built
    pub fn from_config(config: &BackendConfig) -> ClientResult<Self> {
        let base_url = parse_base_url(&config.name, &config.base_url)?;

        let token_header = config
            .token_header
            .as_deref()
            .map(|name| {
                HeaderName::from_bytes(name.as_bytes())
                    .map_err(|_| ClientError::InvalidTokenHeader(name.to_string()))
            })
            .transpose()?;

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .pool_max_idle_per_host(16)
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;

        Ok(Self {
            http_client,
            name: config.name.clone(),
            base_url,
            token_header,
        })
    }

    /// Create a client with default settings for `base_url`
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> ClientResult<Self> {
        Self::from_config(&BackendConfig::new(name, base_url))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a loader path (optionally carrying a query string) against
    /// the base URL
    fn url(&self, path: &str) -> Result<Url, UpstreamError> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| UpstreamError::Transport(format!("invalid URL {}: {}", joined, e)))
    }

    fn request(&self, url: Url, token: Option<&str>, options: &CallOptions) -> RequestBuilder {
        let mut request = self
            .http_client
            .request(to_method(options.method), url)
            .header("X-Request-Id", &options.request_ids.request_id);

        if let Some(forwarded_for) = &options.request_ids.forwarded_for {
            request = request.header("X-Forwarded-For", forwarded_for);
        }
        if let Some(user_agent) = &options.user_agent {
            request = request.header(USER_AGENT, user_agent);
        }
        if let Some(token) = token {
            request = match &self.token_header {
                Some(header) => request.header(header.clone(), token),
                None => request.bearer_auth(token),
            };
        }
        if let Some(body) = &options.body {
            request = request.json(body);
        }
        request
    }

    /// Make one request and decode the response envelope
    async fn send(
        &self,
        url: &Url,
        token: Option<&str>,
        options: &CallOptions,
    ) -> Result<ApiResponse, UpstreamError> {
        let response = self
            .request(url.clone(), token, options)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(response).await;
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let headers = collect_headers(response.headers());
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).map_err(|e| UpstreamError::Decode(e.to_string()))?
        };

        Ok(ApiResponse { body, headers })
    }
}

#[async_trait]
impl ApiCall for HttpBackendClient {
    #[instrument(skip(self, token, options), fields(backend = %self.name, method = %options.method))]
    async fn call(
        &self,
        path: &str,
        token: Option<&str>,
        options: &CallOptions,
    ) -> Result<ApiResponse, UpstreamError> {
        let url = self.url(path)?;
        let response = self.send(&url, token, options).await?;

        debug!(backend = %self.name, path, "Upstream request succeeded");
        Ok(response)
    }
}

fn parse_base_url(backend: &str, base_url: &str) -> ClientResult<Url> {
    let invalid = |reason: String| ClientError::InvalidBaseUrl {
        backend: backend.to_string(),
        reason,
    };
    let url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme '{}'", other))),
    }
}

fn to_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn map_transport_error(e: reqwest::Error) -> UpstreamError {
    if e.is_timeout() {
        UpstreamError::Timeout
    } else {
        UpstreamError::Transport(e.to_string())
    }
}

/// Header names arrive lower-cased from `http`; values that are not
/// visible ASCII are skipped
fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect()
}

/// Extract a readable message from an error response
///
/// Prefers a JSON `error` or `message` field, falling back to the raw body.
async fn error_message(response: Response) -> String {
    let reason = response
        .status()
        .canonical_reason()
        .unwrap_or("Unknown status")
        .to_string();

    let text = match response.text().await {
        Ok(text) if !text.trim().is_empty() => text,
        _ => return reason,
    };

    if let Ok(Value::Object(body)) = serde_json::from_str::<Value>(&text) {
        for field in ["error", "message"] {
            if let Some(Value::String(message)) = body.get(field) {
                return message.clone();
            }
        }
    }

    text.chars().take(MAX_ERROR_MESSAGE_LENGTH).collect()
}
