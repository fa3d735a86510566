//! Auction result GraphQL types

use async_graphql::SimpleObject;
use serde::Deserialize;

/// Historical auction lot from diffusion
#[derive(Debug, Clone, Deserialize, SimpleObject)]
pub struct AuctionLot {
    pub id: String,
    pub title: Option<String>,
    pub lot_number: Option<String>,
    pub sale_date: Option<String>,
    pub currency: Option<String>,
    pub price_realized_cents: Option<i64>,
}
