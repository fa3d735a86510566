//! GraphQL Query root

mod catalog;
mod editorial;
mod user;

use async_graphql::MergedObject;

pub use catalog::CatalogQuery;
pub use editorial::EditorialQuery;
pub use user::UserQuery;

/// Root Query type combining all query domains
#[derive(MergedObject, Default)]
pub struct Query(CatalogQuery, EditorialQuery, UserQuery);
