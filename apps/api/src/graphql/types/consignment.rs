//! Consignment GraphQL types

use async_graphql::SimpleObject;
use serde::Deserialize;

/// Convection submission
#[derive(Debug, Clone, Deserialize, SimpleObject)]
pub struct Submission {
    pub id: String,
    pub title: Option<String>,
    pub state: Option<String>,
    pub artist_id: Option<String>,
}

/// Asset attached to a submission
#[derive(Debug, Clone, Deserialize, SimpleObject)]
pub struct ConsignmentAsset {
    pub id: String,
    pub submission_id: Option<String>,
    pub gemini_token: Option<String>,
    pub asset_type: Option<String>,
}
