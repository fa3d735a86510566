//! Consignment mutations

use async_graphql::{Context, InputObject, Object, Result};
use prism_loaders::{params, HttpMethod};
use serde_json::json;

use crate::graphql::helpers::{decode, graphql_error, loader_error, loaders};
use crate::graphql::types::ConsignmentAsset;

const DEFAULT_ASSET_TYPE: &str = "image";

/// Input for attaching an uploaded image to a submission
#[derive(Debug, InputObject)]
pub struct AddAssetToSubmissionInput {
    pub submission_id: String,
    /// Token of the already uploaded image
    pub gemini_token: String,
    /// Defaults to `image`
    pub asset_type: Option<String>,
}

#[derive(Default)]
pub struct ConsignmentMutation;

#[Object]
impl ConsignmentMutation {
    /// Attach an uploaded asset to one of the user's submissions
    async fn add_asset_to_submission(
        &self,
        ctx: &Context<'_>,
        input: AddAssetToSubmissionInput,
    ) -> Result<ConsignmentAsset> {
        let create = loaders(ctx).map_err(graphql_error)?
            .convection_with_auth
            .path("assets")
            .method(HttpMethod::Post)
            .build();

        let body = create
            .load_with(params(json!({
                "submission_id": input.submission_id,
                "gemini_token": input.gemini_token,
                "asset_type": input.asset_type.as_deref().unwrap_or(DEFAULT_ASSET_TYPE),
            })))
            .await
            .map_err(loader_error)?;

        decode("convection", body).map_err(graphql_error)
    }
}
