use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Redis key holding the cached aggregate statistics. Comment mutations
/// invalidate it; the stats endpoint repopulates it on a miss.
pub const STATS_CACHE_KEY: &str = "api.stats";
