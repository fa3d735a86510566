//! GraphQL HTTP handlers

use std::net::SocketAddr;
use std::sync::Arc;

use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::extract::{ConnectInfo, Extension};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse};

use crate::graphql::PrismSchema;
use crate::loaders::BackendRegistry;
use crate::middleware::request_context;

/// Execute a GraphQL request
///
/// Every execution gets a fresh set of loader factories. Their request
/// scope lives in the request data and is closed when the execution
/// finishes and the data is dropped.
pub async fn graphql_handler(
    Extension(schema): Extension<PrismSchema>,
    Extension(registry): Extension<Arc<BackendRegistry>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let context = request_context(&headers, connect_info.as_ref());
    let request_id = context.request_ids.request_id.clone();

    let loaders = registry.request_loaders(context);
    tracing::debug!(
        request_id = %request_id,
        authenticated = loaders.is_authenticated(),
        scope = %loaders.scope().id(),
        "Executing GraphQL request"
    );

    let request = req.into_inner().data(loaders);
    schema.execute(request).await.into()
}

/// GraphQL Playground handler for development
pub async fn graphql_playground() -> impl IntoResponse {
    Html(async_graphql::http::playground_source(
        async_graphql::http::GraphQLPlaygroundConfig::new("/graphql"),
    ))
}
