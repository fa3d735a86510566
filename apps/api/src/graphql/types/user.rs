//! Current user GraphQL types
//!
//! Everything here is principal-scoped and only ever fetched through the
//! authenticated loader factories.

use async_graphql::{Context, Object, Result, SimpleObject};
use serde::Deserialize;

use crate::graphql::helpers::{decode, graphql_error, loader_error, loaders};
use crate::graphql::pagination::clamp_size;

/// Gravity `me` record
#[derive(Debug, Clone, Deserialize)]
pub struct MeRecord {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// The authenticated user
pub struct Me {
    inner: MeRecord,
}

impl From<MeRecord> for Me {
    fn from(record: MeRecord) -> Self {
        Self { inner: record }
    }
}

#[Object]
impl Me {
    async fn id(&self) -> &str {
        &self.inner.id
    }

    async fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    async fn email(&self) -> Option<&str> {
        self.inner.email.as_deref()
    }

    /// Conversations the user takes part in
    async fn conversations(&self, ctx: &Context<'_>, size: Option<i32>) -> Result<Vec<Conversation>> {
        let conversations = loaders(ctx).map_err(graphql_error)?
            .impulse_with_auth
            .path("conversations")
            .param("from_id", self.inner.id.as_str())
            .param("from_type", "User")
            .build();

        let params = prism_loaders::params(serde_json::json!({ "size": clamp_size(size) }));
        let body = conversations
            .load_with(params)
            .await
            .map_err(loader_error)?;

        #[derive(Deserialize)]
        struct Page {
            conversations: Vec<Conversation>,
        }

        let page: Page = decode("impulse", body).map_err(graphql_error)?;
        Ok(page.conversations)
    }
}

/// Impulse conversation summary
#[derive(Debug, Clone, Deserialize, SimpleObject)]
pub struct Conversation {
    pub id: String,
    pub from_name: Option<String>,
    pub last_message: Option<String>,
    pub last_message_at: Option<String>,
}
