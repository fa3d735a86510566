//! Artist and artwork GraphQL types
//!
//! Backed by gravity responses fetched without authentication.

use async_graphql::{Context, Object, Result, SimpleObject};
use serde::Deserialize;

use crate::graphql::helpers::{decode, graphql_error, loader_error, loaders};
use crate::graphql::pagination::clamp_size;

/// Gravity artist record
#[derive(Debug, Clone, Deserialize)]
pub struct ArtistRecord {
    pub id: String,
    pub slug: Option<String>,
    pub name: Option<String>,
    pub nationality: Option<String>,
    pub birthday: Option<String>,
    pub hometown: Option<String>,
}

/// Artist exposed via GraphQL
pub struct Artist {
    inner: ArtistRecord,
}

impl From<ArtistRecord> for Artist {
    fn from(record: ArtistRecord) -> Self {
        Self { inner: record }
    }
}

#[Object]
impl Artist {
    async fn id(&self) -> &str {
        &self.inner.id
    }

    async fn slug(&self) -> Option<&str> {
        self.inner.slug.as_deref()
    }

    async fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    async fn nationality(&self) -> Option<&str> {
        self.inner.nationality.as_deref()
    }

    async fn birthday(&self) -> Option<&str> {
        self.inner.birthday.as_deref()
    }

    async fn hometown(&self) -> Option<&str> {
        self.inner.hometown.as_deref()
    }

    /// Published artworks by this artist, most recent first
    async fn artworks(&self, ctx: &Context<'_>, size: Option<i32>) -> Result<Vec<Artwork>> {
        let loaders = loaders(ctx).map_err(graphql_error)?;
        let artworks = loaders
            .gravity
            .dynamic(|id: &String| format!("artist/{}/artworks", id))
            .param("published", true)
            .param("sort", "-published_at")
            .build();

        let params = prism_loaders::params(serde_json::json!({ "size": clamp_size(size) }));
        let body = artworks
            .load_with(&self.inner.id, params)
            .await
            .map_err(loader_error)?;

        decode("gravity", body).map_err(graphql_error)
    }
}

/// Artwork exposed via GraphQL
#[derive(Debug, Clone, Deserialize, SimpleObject)]
pub struct Artwork {
    pub id: String,
    pub slug: Option<String>,
    pub title: Option<String>,
    pub date: Option<String>,
    pub category: Option<String>,
    pub medium: Option<String>,
}
