//! GraphQL schema builder for Prism
//!
//! The schema itself holds no loader state. Each execution receives its
//! own [`RequestLoaders`](crate::loaders::RequestLoaders) as request data.

use async_graphql::{EmptySubscription, Schema};

use super::mutation::Mutation;
use super::query::Query;

/// The Prism GraphQL schema type
pub type PrismSchema = Schema<Query, Mutation, EmptySubscription>;

/// Default maximum query depth
const DEFAULT_MAX_DEPTH: usize = 12;

/// Default maximum query complexity
const DEFAULT_MAX_COMPLEXITY: usize = 500;

/// Builder for the GraphQL schema
pub struct SchemaBuilder {
    max_depth: usize,
    max_complexity: usize,
    introspection: bool,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_complexity: DEFAULT_MAX_COMPLEXITY,
            introspection: true,
        }
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn max_complexity(mut self, complexity: usize) -> Self {
        self.max_complexity = complexity;
        self
    }

    /// Disable introspection queries (production)
    pub fn disable_introspection(mut self) -> Self {
        self.introspection = false;
        self
    }

    pub fn build(self) -> PrismSchema {
        let mut builder = Schema::build(Query::default(), Mutation::default(), EmptySubscription)
            .limit_depth(self.max_depth)
            .limit_complexity(self.max_complexity);

        if !self.introspection {
            builder = builder.disable_introspection();
        }

        builder.finish()
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Create the schema with default limits
pub fn build_schema() -> PrismSchema {
    SchemaBuilder::new().build()
}
