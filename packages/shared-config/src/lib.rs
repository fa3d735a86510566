//! Shared configuration types for Prism services
//!
//! This crate provides the configuration consumed by the API server and the
//! loader subsystem: upstream backend endpoints, shared cache selection and
//! Redis connection settings.

mod backend;
mod cache;
mod error;
mod redis;

pub use backend::{
    BackendConfig, DEFAULT_CACHE_TTL_SECS, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS,
};
pub use cache::{CacheBackend, CacheConfig};
pub use error::{ConfigError, ConfigResult};
pub use redis::{RedisConfig, DEFAULT_KEY_PREFIX};

use std::collections::BTreeMap;
use std::env;

/// Upstream services the gateway knows how to reach
pub const KNOWN_BACKENDS: [&str; 7] = [
    "convection",
    "delta",
    "diffusion",
    "galaxy",
    "gravity",
    "impulse",
    "positron",
];

/// Common configuration shared between all services
#[derive(Debug, Clone)]
pub struct CommonConfig {
    /// Redis configuration
    pub redis: RedisConfig,

    /// Shared cache configuration
    pub cache: CacheConfig,

    /// Upstream backends keyed by service name
    pub backends: BTreeMap<String, BackendConfig>,

    /// Environment mode (development, staging, production)
    pub environment: Environment,

    /// Log level (from RUST_LOG or LOG_LEVEL)
    pub log_level: String,
}

/// Application environment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "staging" | "stage" => Self::Staging,
            _ => Self::Development,
        })
    }
}

impl Environment {
    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Staging => write!(f, "staging"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl CommonConfig {
    /// Load common configuration from environment variables
    ///
    /// Every entry of [`KNOWN_BACKENDS`] must have its `<NAME>_API_BASE` set.
    pub fn from_env() -> ConfigResult<Self> {
        let backends = KNOWN_BACKENDS
            .iter()
            .map(|name| BackendConfig::from_env(name).map(|c| (name.to_string(), c)))
            .collect::<ConfigResult<BTreeMap<_, _>>>()?;

        Ok(Self {
            redis: RedisConfig::from_env()?,
            cache: CacheConfig::from_env()?,
            backends,
            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .parse()
                .unwrap_or_default(),
            log_level: env::var("RUST_LOG")
                .or_else(|_| env::var("LOG_LEVEL"))
                .unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Look up the configuration of one backend
    pub fn backend(&self, name: &str) -> ConfigResult<&BackendConfig> {
        self.backends
            .get(name)
            .ok_or_else(|| ConfigError::UnknownBackend(name.to_string()))
    }
}

/// Helper function to get a required environment variable
pub fn get_required_env(name: &str) -> ConfigResult<String> {
    env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

/// Helper function to get an optional environment variable with a default
pub fn get_env_or_default(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Helper function to parse an environment variable into a specific type
pub fn parse_env<T>(name: &str, default: T) -> ConfigResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val
            .parse()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{}", e))),
        Err(_) => Ok(default),
    }
}
