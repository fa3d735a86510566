//! Shared cache configuration

use crate::{get_env_or_default, ConfigError, ConfigResult};

/// Backing store for the cross-request loader cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheBackend {
    /// Process-local in-memory store
    #[default]
    Memory,
    /// Redis store shared by every instance
    Redis,
}

impl std::str::FromStr for CacheBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "in-memory" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            other => Err(ConfigError::InvalidValue(
                "CACHE_BACKEND".to_string(),
                format!("expected 'memory' or 'redis', got '{}'", other),
            )),
        }
    }
}

/// Shared cache configuration
#[derive(Debug, Clone, Default)]
pub struct CacheConfig {
    /// Which store backs the shared cache
    pub backend: CacheBackend,
}

impl CacheConfig {
    /// Load cache configuration from `CACHE_BACKEND`
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            backend: get_env_or_default("CACHE_BACKEND", "memory").parse()?,
        })
    }
}
