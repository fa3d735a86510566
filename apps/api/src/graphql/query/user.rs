//! Queries for the authenticated user
//!
//! These resolve through the request-scoped factories only. Without an
//! access token they fail with `UNAUTHENTICATED` instead of returning
//! anonymous data.

use async_graphql::{Context, Object, Result};

use crate::error::ApiResult;
use crate::graphql::helpers::{decode, graphql_error, loader_error, loaders, optional};
use crate::graphql::types::{Me, MeRecord, Submission};

#[derive(Default)]
pub struct UserQuery;

#[Object]
impl UserQuery {
    /// The user the access token belongs to
    async fn me(&self, ctx: &Context<'_>) -> Result<Me> {
        let body = loaders(ctx).map_err(graphql_error)?
            .gravity_with_auth
            .path("me")
            .build()
            .load()
            .await
            .map_err(loader_error)?;

        let record: MeRecord = decode("gravity", body).map_err(graphql_error)?;
        Ok(Me::from(record))
    }

    /// A consignment submission owned by the user
    async fn submission(&self, ctx: &Context<'_>, id: String) -> Result<Option<Submission>> {
        let loader = loaders(ctx).map_err(graphql_error)?
            .convection_with_auth
            .dynamic(|id: &String| format!("submissions/{}", id))
            .build();

        let result: ApiResult<Submission> = match loader.load(&id).await {
            Ok(body) => decode("convection", body),
            Err(e) => Err(e.into()),
        };
        optional(result).map_err(graphql_error)
    }
}
