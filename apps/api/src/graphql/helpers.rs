//! Resolver plumbing shared by queries and mutations

use async_graphql::{Context, ErrorExtensions};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::loaders::RequestLoaders;

/// Loader factories of the current query execution
pub fn loaders<'a>(ctx: &'a Context<'_>) -> ApiResult<&'a RequestLoaders> {
    ctx.data::<RequestLoaders>()
        .map_err(|_| ApiError::Internal("request loaders missing from context".to_string()))
}

/// Log `e` and turn it into a GraphQL error carrying `code` and `status`
pub fn graphql_error(e: ApiError) -> async_graphql::Error {
    e.log();
    e.extend()
}

/// Same as [`graphql_error`] for a failed loader call
pub fn loader_error(e: prism_loaders::LoaderError) -> async_graphql::Error {
    graphql_error(e.into())
}

/// Deserialize an upstream response body into a GraphQL type
pub fn decode<T: DeserializeOwned>(backend: &str, body: Value) -> ApiResult<T> {
    serde_json::from_value(body).map_err(|e| ApiError::Upstream {
        backend: backend.to_string(),
        status: None,
        message: format!("unexpected response shape: {}", e),
    })
}

/// Turn an upstream 404 into `None`
pub fn optional<T>(result: ApiResult<T>) -> ApiResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde::Deserialize;
    use serde_json::json;
    use tracing_test::traced_test;

    #[derive(Debug, Deserialize)]
    struct Record {
        id: String,
    }

    #[test]
    fn test_decode() {
        let record: Record = decode("gravity", json!({"id": "banksy", "extra": 1})).unwrap();
        assert_eq!(record.id, "banksy");
    }

    #[test]
    fn test_decode_mismatch_is_upstream_error() {
        let result = decode::<Record>("gravity", json!([1, 2]));
        assert_matches!(result, Err(ApiError::Upstream { backend, status: None, .. }) if backend == "gravity");
    }

    #[test]
    fn test_optional_maps_not_found() {
        let missing: ApiResult<()> = Err(ApiError::Upstream {
            backend: "positron".into(),
            status: Some(404),
            message: "Not Found".into(),
        });
        assert_matches!(optional(missing), Ok(None));

        let failing: ApiResult<()> = Err(ApiError::Upstream {
            backend: "positron".into(),
            status: Some(500),
            message: "boom".into(),
        });
        assert!(optional(failing).is_err());
        assert_matches!(optional(Ok(1)), Ok(Some(1)));
    }

    #[traced_test]
    #[test]
    fn test_graphql_error_keeps_code_and_status() {
        let error = graphql_error(ApiError::Upstream {
            backend: "diffusion".into(),
            status: Some(503),
            message: "Service Unavailable".into(),
        });

        assert_eq!(error.message, "diffusion request failed: Service Unavailable");
        let extensions = error.extensions.expect("extensions are set");
        assert_eq!(
            extensions.get("code"),
            Some(&async_graphql::Value::from("UPSTREAM_ERROR"))
        );
        assert_eq!(extensions.get("status"), Some(&async_graphql::Value::from(503u16)));
        assert!(logs_contain("Upstream failure"));
    }

    #[test]
    fn test_loader_error_maps_missing_session() {
        let error = loader_error(prism_loaders::LoaderError::AuthenticationMissing {
            backend: "impulse".into(),
        });

        let extensions = error.extensions.expect("extensions are set");
        assert_eq!(
            extensions.get("code"),
            Some(&async_graphql::Value::from("UNAUTHENTICATED"))
        );
        assert!(extensions.get("status").is_none());
    }
}
