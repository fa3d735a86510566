//! Request middleware for the Prism API
//!
//! - `request_context`: derives upstream request identity (request id,
//!   forwarded-for, user agent, access token) from incoming headers

pub mod request_context;

pub use request_context::{
    extract_bearer_token, extract_forwarded_for, extract_request_id, extract_user_agent,
    request_context,
};
