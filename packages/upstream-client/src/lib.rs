//! HTTP transport for Prism upstream services
//!
//! This crate provides [`HttpBackendClient`], the `ApiCall` implementation
//! used for every backend service:
//! - Paths resolved against the backend's base URL
//! - Access token sent as `Authorization: Bearer` or a custom header
//! - `X-Request-Id`, `X-Forwarded-For` and `User-Agent` propagation
//! - JSON response decoding (empty bodies become `null`)
//!
//! Each call is one HTTP request. Retries and throttling are applied by the
//! owning `prism_loaders::Backend`, so every attempt is throttled.
//!
//! # Example
//!
//! ```rust,no_run
//! use prism_loaders::{ApiCall, CallOptions};
//! use prism_upstream_client::HttpBackendClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gravity = HttpBackendClient::new("gravity", "https://api.example.com/api/v1")?;
//!
//! let response = gravity
//!     .call("artist/banksy", None, &CallOptions::default())
//!     .await?;
//! println!("{}", response.body);
//! # Ok(())
//! # }
//! ```
//!
//! # Environment Variables
//!
//! Clients are usually built from `prism_shared_config::BackendConfig`,
//! which reads `<NAME>_API_BASE`, `<NAME>_TIMEOUT_SECS` and
//! `<NAME>_TOKEN_HEADER`.

mod client;
mod error;

pub use client::HttpBackendClient;
pub use error::{ClientError, ClientResult};
