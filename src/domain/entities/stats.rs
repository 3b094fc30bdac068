use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Site-wide aggregate counts. Serialized form is both the API response
/// and the cached payload, so `generated_at` tells readers how stale a
/// cache hit is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiStats {
    pub articles: i64,
    pub users: i64,
    pub comments: i64,
    pub images: i64,
    pub generated_at: DateTime<Utc>,
}
