use redis::Client as RedisClient;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod background_task;

pub use domain::{entities, use_cases};
pub use interfaces::{handlers, repositories};
pub use infrastructure::{cache, db, media, storage, utils, web};

use cache::stats_cache::RedisStatsCache;
use repositories::sqlx_repo::{SqlxCommentRepo, SqlxImageSetRepo, SqlxStatsRepo};
use storage::local::LocalStorage;
use use_cases::comments::CommentHandler;
use use_cases::images::ImageHandler;
use use_cases::stats::StatsHandler;

pub use interfaces::routes::configure_routes;

pub struct AppState {
    pub comment_handler: AppCommentHandler,
    pub image_handler: AppImageHandler,
    pub stats_handler: AppStatsHandler,
    pub storage: LocalStorage,
    pub redis_client: Option<RedisClient>,
}

pub type AppCommentHandler = CommentHandler<SqlxCommentRepo, RedisStatsCache>;
pub type AppImageHandler = ImageHandler<LocalStorage, SqlxImageSetRepo>;
pub type AppStatsHandler = StatsHandler<SqlxStatsRepo, RedisStatsCache>;

impl AppState {
    pub fn new(config: &settings::AppConfig, pool: sqlx::PgPool) -> Self {
        let storage = LocalStorage::new(config.storage_root.clone());
        let stats_cache = RedisStatsCache::new(config.redis_url.as_deref());

        let comment_handler =
            CommentHandler::new(SqlxCommentRepo::new(pool.clone()), stats_cache.clone());
        let image_handler =
            ImageHandler::new(storage.clone(), SqlxImageSetRepo::new(pool.clone()));
        let stats_handler = StatsHandler::new(
            SqlxStatsRepo::new(pool),
            stats_cache,
            config.stats_cache_ttl_secs,
        );

        let redis_client = config.redis_url.as_ref().and_then(|url| {
            RedisClient::open(url.as_str())
                .map_err(|e| tracing::error!("Redis connection error: {}", e))
                .ok()
        });

        AppState {
            comment_handler,
            image_handler,
            stats_handler,
            storage,
            redis_client,
        }
    }
}
