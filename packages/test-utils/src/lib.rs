//! Shared test utilities for the Prism workspace
//!
//! This crate provides mock implementations of external services for testing
//! without network dependencies. These mocks are used by the upstream client
//! and API test suites.
//!
//! # Mock Services
//!
//! - [`MockBackendServer`] - Mock REST backend for HTTP client and resolver tests
//!
//! # Example
//!
//! ```rust,ignore
//! use prism_test_utils::MockBackendServer;
//!
//! #[tokio::test]
//! async fn test_with_mocks() {
//!     let gravity = MockBackendServer::start().await;
//!     gravity.mock_json("GET", "/artist/banksy", serde_json::json!({"id": "banksy"})).await;
//!
//!     // Use gravity.url() to configure your client
//! }
//! ```

mod backend;

pub use backend::MockBackendServer;
