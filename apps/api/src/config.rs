//! API server configuration

use std::env;

use anyhow::{Context, Result};
use prism_shared_config::{CommonConfig, Environment, RedisConfig};

/// Fallback `User-Agent` for upstream calls when the client sends none
pub const DEFAULT_USER_AGENT: &str = concat!("Prism/", env!("CARGO_PKG_VERSION"));

/// API server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Common configuration shared with the loader subsystem
    pub common: CommonConfig,

    /// Server port (default: 8080)
    pub port: u16,

    /// `User-Agent` forwarded upstream when the client does not send one
    pub user_agent: String,

    /// CORS allowed origins (optional)
    pub cors_allowed_origins: Option<Vec<String>>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Every backend in `prism_shared_config::KNOWN_BACKENDS` needs its
    /// `<NAME>_API_BASE` variable.
    pub fn from_env() -> Result<Self> {
        let common = CommonConfig::from_env().context("Failed to load config")?;

        Ok(Self {
            common,

            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid PORT value")?,

            user_agent: env::var("USER_AGENT")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),

            cors_allowed_origins: parse_origins(env::var("CORS_ORIGINS").ok()),
        })
    }

    pub fn environment(&self) -> Environment {
        self.common.environment
    }

    pub fn is_production(&self) -> bool {
        self.common.environment.is_production()
    }

    pub fn redis(&self) -> &RedisConfig {
        &self.common.redis
    }
}

fn parse_origins(value: Option<String>) -> Option<Vec<String>> {
    value.map(|s| {
        s.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
}
