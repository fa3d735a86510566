//! Upstream backend service configuration

use url::Url;

use crate::{get_required_env, parse_env, ConfigError, ConfigResult};

/// Default lifetime of shared cache entries (one hour)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

/// Default upstream request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default number of retries for idempotent upstream requests
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Configuration for one upstream REST service
///
/// Every value is read from variables prefixed with the upper-cased backend
/// name, e.g. `GRAVITY_API_BASE` or `DIFFUSION_REQUEST_THROTTLE_MS`.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Backend service name, used in loader keys and logs
    pub name: String,

    /// Base URL every request path is resolved against
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Retries for transient failures of idempotent requests
    pub max_retries: u32,

    /// TTL applied when responses are written to the shared cache
    pub cache_ttl_secs: u64,

    /// Minimum interval between two outbound calls, if throttled
    pub request_throttle_ms: Option<u64>,

    /// Header carrying the access token; `None` means `Authorization: Bearer`
    pub token_header: Option<String>,
}

impl BackendConfig {
    /// Load configuration for the named backend from environment variables
    ///
    /// `<NAME>_API_BASE` is required; everything else has a default.
    pub fn from_env(name: &str) -> ConfigResult<Self> {
        let prefix = Self::env_prefix(name);
        let base_var = format!("{}_API_BASE", prefix);
        let base_url = get_required_env(&base_var)?;
        validate_base_url(&base_var, &base_url)?;

        let throttle: u64 = parse_env(&format!("{}_REQUEST_THROTTLE_MS", prefix), 0)?;

        Ok(Self {
            name: name.to_string(),
            base_url,
            timeout_secs: parse_env(&format!("{}_TIMEOUT_SECS", prefix), DEFAULT_TIMEOUT_SECS)?,
            max_retries: parse_env(&format!("{}_MAX_RETRIES", prefix), DEFAULT_MAX_RETRIES)?,
            cache_ttl_secs: parse_env(
                &format!("{}_CACHE_TTL_SECS", prefix),
                DEFAULT_CACHE_TTL_SECS,
            )?,
            request_throttle_ms: (throttle > 0).then_some(throttle),
            token_header: std::env::var(format!("{}_TOKEN_HEADER", prefix))
                .ok()
                .filter(|s| !s.is_empty()),
        })
    }

    /// Create a configuration with a custom base URL (useful for testing)
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            request_throttle_ms: None,
            token_header: None,
        }
    }

    /// Set a request throttle interval
    pub fn with_throttle_ms(mut self, interval_ms: u64) -> Self {
        self.request_throttle_ms = Some(interval_ms);
        self
    }

    /// Set the shared cache TTL
    pub fn with_cache_ttl_secs(mut self, ttl_secs: u64) -> Self {
        self.cache_ttl_secs = ttl_secs;
        self
    }

    /// Send the access token in a custom header instead of `Authorization`
    pub fn with_token_header(mut self, header: impl Into<String>) -> Self {
        self.token_header = Some(header.into());
        self
    }

    fn env_prefix(name: &str) -> String {
        name.to_ascii_uppercase().replace('-', "_")
    }
}

fn validate_base_url(var: &str, value: &str) -> ConfigResult<()> {
    let parsed =
        Url::parse(value).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::InvalidUrl(
            var.to_string(),
            format!("unsupported scheme '{}'", other),
        )),
    }
}
