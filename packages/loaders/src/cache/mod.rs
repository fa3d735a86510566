//! Shared cross-request cache stores
//!
//! Only loaders of non-principal-scoped backends use these stores. Values
//! are whole [`ApiResponse`] envelopes, replaced on every write and never
//! mutated in place.

mod memory;
mod redis_store;

pub use self::memory::MemoryCache;
pub use self::redis_store::RedisCache;

use std::time::Duration;

use async_trait::async_trait;

use crate::api::ApiResponse;
use crate::error::CacheResult;

/// Key-value store with per-entry TTL
#[async_trait]
pub trait SharedCache: Send + Sync + 'static {
    /// Fetch a live entry; expired or missing keys yield `None`
    async fn get(&self, key: &str) -> CacheResult<Option<ApiResponse>>;

    /// Store `value` under `key` for `ttl`, replacing any previous entry
    async fn set(&self, key: &str, value: &ApiResponse, ttl: Duration) -> CacheResult<()>;
}
