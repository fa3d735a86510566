//! Catalog queries: artists, artworks and auction results
//!
//! Public data, served through the cross-request cache.

use async_graphql::{Context, Object, Result};

use crate::error::ApiResult;
use crate::graphql::helpers::{decode, graphql_error, loaders, optional};
use crate::graphql::types::{Artist, ArtistRecord, Artwork, AuctionLot};

#[derive(Default)]
pub struct CatalogQuery;

#[Object]
impl CatalogQuery {
    /// Look up an artist by id or slug
    async fn artist(&self, ctx: &Context<'_>, id: String) -> Result<Option<Artist>> {
        let loader = loaders(ctx).map_err(graphql_error)?
            .gravity
            .dynamic(|id: &String| format!("artist/{}", id))
            .build();

        let result: ApiResult<ArtistRecord> = match loader.load(&id).await {
            Ok(body) => decode("gravity", body),
            Err(e) => Err(e.into()),
        };
        Ok(optional(result).map_err(graphql_error)?.map(Artist::from))
    }

    /// Look up an artwork by id or slug
    async fn artwork(&self, ctx: &Context<'_>, id: String) -> Result<Option<Artwork>> {
        let loader = loaders(ctx).map_err(graphql_error)?
            .gravity
            .dynamic(|id: &String| format!("artwork/{}", id))
            .build();

        let result: ApiResult<Artwork> = match loader.load(&id).await {
            Ok(body) => decode("gravity", body),
            Err(e) => Err(e.into()),
        };
        optional(result).map_err(graphql_error)
    }

    /// Historical auction lot by id
    async fn auction_lot(&self, ctx: &Context<'_>, id: String) -> Result<Option<AuctionLot>> {
        let loader = loaders(ctx).map_err(graphql_error)?
            .diffusion
            .dynamic(|id: &String| format!("lots/{}", id))
            .build();

        let result: ApiResult<AuctionLot> = match loader.load(&id).await {
            Ok(body) => decode("diffusion", body),
            Err(e) => Err(e.into()),
        };
        optional(result).map_err(graphql_error)
    }
}
