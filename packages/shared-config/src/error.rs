//! Configuration error types

use thiserror::Error;

/// Errors raised while loading service configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Missing required environment variable
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Environment variable could not be parsed into the expected type
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),

    /// Backend base URL is not an absolute http(s) URL
    #[error("invalid URL format for {0}: {1}")]
    InvalidUrl(String, String),

    /// A backend was requested that is not part of the registry
    #[error("unknown backend service: {0}")]
    UnknownBackend(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
