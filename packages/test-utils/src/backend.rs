//! Mock upstream backend service
//!
//! Provides a [`MockBackendServer`] that stands in for any of the REST
//! services behind the gateway, so HTTP clients and resolvers can be tested
//! without a real upstream.

use std::time::Duration;

use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Mock REST backend
///
/// Wraps a [`wiremock::MockServer`] with helpers for the responses loaders
/// care about: JSON bodies, response headers, error statuses, slow and
/// flaky endpoints.
///
/// # Example
///
/// ```rust,ignore
/// use prism_test_utils::MockBackendServer;
/// use serde_json::json;
///
/// #[tokio::test]
/// async fn test_artist_lookup() {
///     let gravity = MockBackendServer::start().await;
///     gravity.mock_json("GET", "/artist/banksy", json!({"id": "banksy"})).await;
///
///     // Point the gravity client at gravity.url()
///     assert_eq!(gravity.received_count("/artist/banksy").await, 0);
/// }
/// ```
pub struct MockBackendServer {
    server: MockServer,
}

impl MockBackendServer {
    /// Start a new mock backend on a random local port
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL of the server
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Underlying wiremock server, for mounting custom mocks
    pub fn inner(&self) -> &MockServer {
        &self.server
    }

    /// Mount a `200` JSON response for `http_method` on `endpoint`
    pub async fn mock_json(&self, http_method: &str, endpoint: &str, body: Value) {
        Mock::given(method(http_method))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mount a `200` JSON response carrying extra response headers
    pub async fn mock_json_with_headers(&self, endpoint: &str, body: Value, headers: &[(&str, &str)]) {
        let mut template = ResponseTemplate::new(200).set_body_json(body);
        for (name, value) in headers {
            template = template.insert_header(*name, *value);
        }

        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(template)
            .mount(&self.server)
            .await;
    }

    /// Mount a JSON response that takes `delay` to arrive
    pub async fn mock_json_delayed(&self, endpoint: &str, body: Value, delay: Duration) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(200).set_body_json(body).set_delay(delay))
            .mount(&self.server)
            .await;
    }

    /// Mount an empty `204` response
    pub async fn mock_no_content(&self, http_method: &str, endpoint: &str) {
        Mock::given(method(http_method))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(204))
            .mount(&self.server)
            .await;
    }

    /// Mount an error response with a JSON `{"error": message}` body
    pub async fn mock_status(&self, http_method: &str, endpoint: &str, status: u16, message: &str) {
        Mock::given(method(http_method))
            .and(path(endpoint))
            .respond_with(
                ResponseTemplate::new(status).set_body_json(serde_json::json!({ "error": message })),
            )
            .mount(&self.server)
            .await;
    }

    /// Mount an endpoint that fails `failures` times with `status` before
    /// answering with `body`
    pub async fn mock_flaky(&self, endpoint: &str, failures: u64, status: u16, body: Value) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(status))
            .up_to_n_times(failures)
            .with_priority(1)
            .mount(&self.server)
            .await;

        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .with_priority(2)
            .mount(&self.server)
            .await;
    }

    /// Every request received so far
    pub async fn received_requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// Requests received for `endpoint`
    pub async fn requests_to(&self, endpoint: &str) -> Vec<Request> {
        self.received_requests()
            .await
            .into_iter()
            .filter(|request| request.url.path() == endpoint)
            .collect()
    }

    /// Number of requests received for `endpoint`
    pub async fn received_count(&self, endpoint: &str) -> usize {
        self.requests_to(endpoint).await.len()
    }
}
