//! In-process upstream mock
//!
//! [`RecordingApi`] implements `ApiCall` without any network: it counts
//! calls, records what each call asked for and when it started, and can be
//! told to be slow or to fail.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use prism_loaders::{
    ApiCall, ApiResponse, Backend, CallOptions, GlobalParams, MemoryCache, RequestIds,
    SharedCacheLayer, Throttle, UpstreamError,
};
use serde_json::json;
use tokio::time::Instant;

/// One recorded upstream call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub path: String,
    pub token: Option<String>,
    pub options: CallOptions,
    pub started_at: Instant,
}

pub struct RecordingApi {
    response: ApiResponse,
    delay: Duration,
    failures_left: AtomicUsize,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingApi {
    /// Mock answering every call with `{"id": "1"}`
    pub fn new() -> Self {
        Self::responding(ApiResponse::new(json!({"id": "1"})))
    }

    pub fn responding(response: ApiResponse) -> Self {
        Self {
            response,
            delay: Duration::ZERO,
            failures_left: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Hold every call for `delay` before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Answer the next `count` calls with a 502
    pub fn failing_times(self, count: usize) -> Self {
        self.failures_left.store(count, Ordering::SeqCst);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.path).collect()
    }
}

#[async_trait]
impl ApiCall for RecordingApi {
    async fn call(
        &self,
        path: &str,
        token: Option<&str>,
        options: &CallOptions,
    ) -> Result<ApiResponse, UpstreamError> {
        self.calls.lock().unwrap().push(RecordedCall {
            path: path.to_string(),
            token: token.map(str::to_string),
            options: options.clone(),
            started_at: Instant::now(),
        });

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(UpstreamError::Status {
                status: 502,
                message: "Bad Gateway".to_string(),
            });
        }

        Ok(self.response.clone())
    }
}

pub fn globals(request_id: &str) -> GlobalParams {
    GlobalParams::new(RequestIds::new(request_id)).with_user_agent("prism-tests")
}

pub fn backend(name: &str, api: &Arc<RecordingApi>) -> Arc<Backend> {
    Arc::new(Backend::new(name, api.clone()))
}

pub fn throttled_backend(name: &str, api: &Arc<RecordingApi>, interval_ms: u64) -> Arc<Backend> {
    Arc::new(Backend::new(name, api.clone()).with_throttle(Throttle::from_millis(interval_ms)))
}

pub fn shared_layer() -> Arc<SharedCacheLayer> {
    Arc::new(SharedCacheLayer::new(Arc::new(MemoryCache::new())))
}
