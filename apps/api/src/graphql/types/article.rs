//! Editorial GraphQL types

use async_graphql::SimpleObject;
use serde::Deserialize;

/// Positron article
#[derive(Debug, Clone, Deserialize, SimpleObject)]
pub struct Article {
    pub id: String,
    pub slug: Option<String>,
    pub title: Option<String>,
    pub published_at: Option<String>,
    pub author_id: Option<String>,
}
