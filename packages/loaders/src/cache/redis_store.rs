//! Redis-backed shared cache
//!
//! Cluster-wide store: every gateway instance pointed at the same Redis
//! shares cached upstream responses. Values are stored as JSON with `EX`
//! set to the entry TTL, so Redis expires them on its own.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use tokio::sync::OnceCell;
use tracing::debug;

use super::SharedCache;
use crate::api::ApiResponse;
use crate::error::CacheResult;

/// Shared cache stored in Redis
pub struct RedisCache {
    client: redis::Client,
    key_prefix: String,
    connection: OnceCell<MultiplexedConnection>,
}

impl RedisCache {
    /// Create a cache using `client`, namespacing keys with `key_prefix`
    ///
    /// No connection is opened until the first command.
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
            connection: OnceCell::new(),
        }
    }

    /// Open a client for `url` and build the cache
    pub fn open(url: &str, key_prefix: impl Into<String>) -> CacheResult<Self> {
        Ok(Self::new(redis::Client::open(url)?, key_prefix))
    }

    /// Check connectivity with a `PING`
    pub async fn ping(&self) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    async fn connection(&self) -> CacheResult<MultiplexedConnection> {
        let conn = self
            .connection
            .get_or_try_init(|| async {
                debug!("Opening Redis connection for shared loader cache");
                self.client.get_multiplexed_async_connection().await
            })
            .await?;
        Ok(conn.clone())
    }
}

/// Redis `EX` takes whole seconds; sub-second TTLs round up to one
fn ttl_seconds(ttl: Duration) -> u64 {
    let secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
    secs.max(1)
}

#[async_trait]
impl SharedCache for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<ApiResponse>> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = redis::cmd("GET")
            .arg(self.namespaced(key))
            .query_async(&mut conn)
            .await?;

        match raw {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &ApiResponse, ttl: Duration) -> CacheResult<()> {
        let payload = serde_json::to_string(value)?;
        let mut conn = self.connection().await?;
        let _: () = redis::cmd("SET")
            .arg(self.namespaced(key))
            .arg(payload)
            .arg("EX")
            .arg(ttl_seconds(ttl))
            .query_async(&mut conn)
            .await?;
        Ok(())
    }
}
