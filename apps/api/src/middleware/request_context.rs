//! Request identity extraction
//!
//! Builds the [`RequestContext`] upstream calls are decorated with: the
//! request id, the forwarded-for chain, the client `User-Agent` and the
//! caller's access token.

use axum::extract::ConnectInfo;
use axum::http::{header, HeaderMap};
use prism_loaders::{AccessToken, RequestIds};
use std::net::SocketAddr;
use uuid::Uuid;

use crate::loaders::RequestContext;

const REQUEST_ID_HEADER: &str = "x-request-id";
const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Assemble the upstream request context from incoming headers
pub fn request_context(
    headers: &HeaderMap,
    connect_info: Option<&ConnectInfo<SocketAddr>>,
) -> RequestContext {
    let mut request_ids = RequestIds::new(extract_request_id(headers));
    request_ids.forwarded_for = extract_forwarded_for(headers, connect_info);

    RequestContext {
        request_ids,
        user_agent: extract_user_agent(headers),
        access_token: extract_bearer_token(headers).map(AccessToken::new),
    }
}

/// Reuse the caller's request id, or mint one
pub fn extract_request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Forwarded-for chain with the peer address appended, or the peer alone
pub fn extract_forwarded_for(
    headers: &HeaderMap,
    connect_info: Option<&ConnectInfo<SocketAddr>>,
) -> Option<String> {
    let chain = headers
        .get(FORWARDED_FOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|chain| !chain.is_empty());
    let peer = connect_info.map(|info| info.0.ip().to_string());

    match (chain, peer) {
        (Some(chain), Some(peer)) => Some(format!("{}, {}", chain, peer)),
        (Some(chain), None) => Some(chain.to_string()),
        (None, peer) => peer,
    }
}

/// Extract user agent from headers
pub fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .filter(|ua| !ua.is_empty())
        .map(|s| s.to_string())
}

/// Extract bearer token from Authorization header (case-insensitive)
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())?;

    let mut parts = value.split_whitespace();
    let scheme = parts.next()?;
    let token = parts.next()?;

    // Reject malformed values like "Bearer <token> <extra>"
    if parts.next().is_some() {
        return None;
    }

    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}
