//! Editorial queries

use async_graphql::{Context, Object, Result};

use crate::error::ApiResult;
use crate::graphql::helpers::{decode, graphql_error, loaders, optional};
use crate::graphql::types::Article;

#[derive(Default)]
pub struct EditorialQuery;

#[Object]
impl EditorialQuery {
    /// Look up a published article by id or slug
    async fn article(&self, ctx: &Context<'_>, id: String) -> Result<Option<Article>> {
        let loader = loaders(ctx).map_err(graphql_error)?
            .positron
            .dynamic(|id: &String| format!("articles/{}", id))
            .build();

        let result: ApiResult<Article> = match loader.load(&id).await {
            Ok(body) => decode("positron", body),
            Err(e) => Err(e.into()),
        };
        optional(result).map_err(graphql_error)
    }
}
