//! HTTP route handlers for the Prism API
//!
//! - GraphQL endpoint and playground
//! - Health check and readiness endpoints

pub mod graphql;
pub mod health;

pub use graphql::{graphql_handler, graphql_playground};
pub use health::{health_router, HealthState};
