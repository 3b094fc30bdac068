use crate::cache::stats_cache::StatsCache;
use crate::entities::stats::ApiStats;
use crate::errors::AppError;
use crate::repositories::stats::StatsRepository;

pub struct StatsHandler<R, C>
where
    R: StatsRepository,
    C: StatsCache,
{
    pub stats_repo: R,
    pub cache: C,
    pub cache_ttl_secs: u64,
}

impl<R, C> StatsHandler<R, C>
where
    R: StatsRepository,
    C: StatsCache,
{
    pub fn new(stats_repo: R, cache: C, cache_ttl_secs: u64) -> Self {
        StatsHandler {
            stats_repo,
            cache,
            cache_ttl_secs,
        }
    }

    /// Read-through aggregate counts: serves the cached payload when one
    /// exists, otherwise computes fresh counts and caches them. A
    /// malformed cached payload is discarded, never served.
    pub async fn get_stats(&self) -> Result<ApiStats, AppError> {
        if let Some(payload) = self.cache.get_stats().await {
            match serde_json::from_str::<ApiStats>(&payload) {
                Ok(stats) => return Ok(stats),
                Err(e) => tracing::warn!("Discarding malformed cached stats: {}", e),
            }
        }

        let stats = self.stats_repo.collect_stats().await?;
        match serde_json::to_string(&stats) {
            Ok(payload) => self.cache.put_stats(&payload, self.cache_ttl_secs).await,
            Err(e) => tracing::warn!("Failed to serialize stats for caching: {}", e),
        }

        Ok(stats)
    }
}
