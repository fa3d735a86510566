//! GraphQL Mutation root

mod consignment;

use async_graphql::MergedObject;

pub use consignment::{AddAssetToSubmissionInput, ConsignmentMutation};

/// Root Mutation type combining all mutation domains
#[derive(MergedObject, Default)]
pub struct Mutation(ConsignmentMutation);
