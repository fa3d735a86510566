//! GraphQL schema and resolvers for Prism
//!
//! Resolvers do no data fetching of their own: every field goes through a
//! loader factory taken from the per-request
//! [`RequestLoaders`](crate::loaders::RequestLoaders).

pub mod helpers;
pub mod mutation;
pub mod pagination;
pub mod query;
pub mod schema;
pub mod types;

pub use schema::{build_schema, PrismSchema, SchemaBuilder};
