use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{self, PgPool};
use uuid::Uuid;

use crate::{
    entities::image::{ImageSetInsert, ImageSetRow},
    errors::AppError,
    repositories::sqlx_repo::SqlxImageSetRepo,
};

#[async_trait]
pub trait ImageSetRepository: Sync + Send {
    async fn create_image_set(&self, set: &ImageSetInsert) -> Result<Uuid, AppError>;
    /// Looks a set up by any of its member paths, primary or variant.
    async fn find_by_member_path(&self, path: &str) -> Result<Option<ImageSetRow>, AppError>;
    async fn base_exists(&self, base: &str) -> Result<bool, AppError>;
    async fn delete_image_set(&self, id: &Uuid) -> Result<(), AppError>;
    /// Manifest rows created before `cutoff`, oldest first, for the
    /// orphan sweep.
    async fn list_created_before(
        &self,
        cutoff: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<ImageSetRow>, AppError>;
}

impl SqlxImageSetRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxImageSetRepo { pool }
    }
}

#[async_trait]
impl ImageSetRepository for SqlxImageSetRepo {
    async fn create_image_set(&self, set: &ImageSetInsert) -> Result<Uuid, AppError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO image_sets (
                base, extension, primary_path, member_paths,
                original_size, optimized_size, width, height
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(&set.base)
        .bind(&set.extension)
        .bind(&set.primary_path)
        .bind(&set.member_paths)
        .bind(set.original_size)
        .bind(set.optimized_size)
        .bind(set.width)
        .bind(set.height)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("image_sets_base_key") {
                    return AppError::Conflict("Image name already in use".into());
                }
            }
            AppError::from(e)
        })?;

        Ok(id)
    }

    async fn find_by_member_path(&self, path: &str) -> Result<Option<ImageSetRow>, AppError> {
        let set = sqlx::query_as::<_, ImageSetRow>(
            r#"
            SELECT id, base, extension, primary_path, member_paths,
                   original_size, optimized_size, width, height, created_at
            FROM image_sets
            WHERE $1 = ANY(member_paths)
            "#,
        )
        .bind(path)
        .fetch_optional(&self.pool)
        .await?;

        Ok(set)
    }

    async fn base_exists(&self, base: &str) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (SELECT 1 FROM image_sets WHERE base = $1)
            "#,
        )
        .bind(base)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn delete_image_set(&self, id: &Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM image_sets WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Record not found".into()));
        }

        Ok(())
    }

    async fn list_created_before(
        &self,
        cutoff: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<ImageSetRow>, AppError> {
        let sets = sqlx::query_as::<_, ImageSetRow>(
            r#"
            SELECT id, base, extension, primary_path, member_paths,
                   original_size, optimized_size, width, height, created_at
            FROM image_sets
            WHERE created_at < $1
            ORDER BY created_at ASC
            LIMIT $2
            "#,
        )
        .bind(cutoff)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sets)
    }
}
