use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use crate::{
    entities::stats::ApiStats, errors::AppError, repositories::sqlx_repo::SqlxStatsRepo,
};

#[async_trait]
pub trait StatsRepository: Sync + Send {
    async fn collect_stats(&self) -> Result<ApiStats, AppError>;
    async fn check_connection(&self) -> Result<(), AppError>;
}

impl SqlxStatsRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxStatsRepo { pool }
    }
}

#[async_trait]
impl StatsRepository for SqlxStatsRepo {
    async fn collect_stats(&self) -> Result<ApiStats, AppError> {
        // One scan per table; scalar subselects keep it a single round trip
        let (articles, users, comments, images): (i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM articles),
                (SELECT COUNT(*) FROM users),
                (SELECT COUNT(*) FROM comments),
                (SELECT COUNT(*) FROM image_sets)
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(ApiStats {
            articles,
            users,
            comments,
            images,
            generated_at: Utc::now(),
        })
    }

    async fn check_connection(&self) -> Result<(), AppError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}
