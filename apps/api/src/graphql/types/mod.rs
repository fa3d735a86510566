//! GraphQL type definitions for Prism
//!
//! Object types are deserialized straight from upstream response bodies.

mod article;
mod artist;
mod auction;
mod consignment;
mod user;

pub use article::Article;
pub use artist::{Artist, ArtistRecord, Artwork};
pub use auction::AuctionLot;
pub use consignment::{ConsignmentAsset, Submission};
pub use user::{Conversation, Me, MeRecord};
