//! Cached site statistics.
//!
//! Every write path that changes a counted table notifies one
//! [`StatsInvalidator`] instead of touching cache keys directly, so the
//! key and its lifecycle live in a single place. All cache traffic is
//! best-effort: when Redis is absent or down, reads miss and writes are
//! dropped, and the API serves freshly computed stats.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::constants::STATS_CACHE_KEY;

/// Observer notified after any mutation that changes the site stats.
#[async_trait]
pub trait StatsInvalidator: Send + Sync {
    /// Drops the cached stats payload so the next read recomputes it.
    async fn invalidate_stats(&self);
}

/// Read-through cache for the serialized stats payload.
#[async_trait]
pub trait StatsCache: StatsInvalidator {
    async fn get_stats(&self) -> Option<String>;

    async fn put_stats(&self, payload: &str, ttl_secs: u64);
}

/// Redis-backed stats cache. Holds no connection; one multiplexed
/// connection is opened per call and dropped after.
#[derive(Clone)]
pub struct RedisStatsCache {
    client: Option<redis::Client>,
}

impl RedisStatsCache {
    /// Builds a cache from an optional Redis URL. A missing or invalid
    /// URL disables caching rather than failing startup.
    pub fn new(redis_url: Option<&str>) -> Self {
        let client = redis_url.and_then(|url| match redis::Client::open(url) {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!("Invalid Redis URL, stats cache disabled: {}", e);
                None
            }
        });
        Self { client }
    }

    async fn connection(&self) -> Option<MultiplexedConnection> {
        let client = self.client.as_ref()?;
        match client.get_multiplexed_async_connection().await {
            Ok(con) => Some(con),
            Err(e) => {
                tracing::warn!("Redis unavailable, skipping stats cache: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl StatsInvalidator for RedisStatsCache {
    async fn invalidate_stats(&self) {
        if let Some(mut con) = self.connection().await {
            if let Err(e) = con.del::<_, ()>(STATS_CACHE_KEY).await {
                tracing::warn!("Failed to invalidate stats cache: {}", e);
            } else {
                tracing::debug!(key = STATS_CACHE_KEY, "stats cache invalidated");
            }
        }
    }
}

#[async_trait]
impl StatsCache for RedisStatsCache {
    async fn get_stats(&self) -> Option<String> {
        let mut con = self.connection().await?;
        match con.get::<_, Option<String>>(STATS_CACHE_KEY).await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Failed to read stats cache: {}", e);
                None
            }
        }
    }

    async fn put_stats(&self, payload: &str, ttl_secs: u64) {
        if let Some(mut con) = self.connection().await {
            if let Err(e) = con
                .set_ex::<_, _, ()>(STATS_CACHE_KEY, payload, ttl_secs)
                .await
            {
                tracing::warn!("Failed to write stats cache: {}", e);
            }
        }
    }
}
