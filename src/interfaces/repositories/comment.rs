use async_trait::async_trait;
use sqlx::{self, PgPool};
use uuid::Uuid;

use crate::{
    entities::comment::{CommentInsert, CommentRow, CommentWithUserRow},
    errors::AppError,
    repositories::sqlx_repo::SqlxCommentRepo,
};

#[async_trait]
pub trait CommentRepository: Sync + Send {
    async fn list_by_article(&self, article_id: &Uuid)
        -> Result<Vec<CommentWithUserRow>, AppError>;
    async fn create_comment(&self, comment: &CommentInsert)
        -> Result<CommentWithUserRow, AppError>;
    async fn update_comment(&self, id: &Uuid, content: &str) -> Result<CommentRow, AppError>;
    /// Deletes a comment and returns the article it belonged to.
    async fn delete_comment(&self, id: &Uuid) -> Result<Uuid, AppError>;
    async fn count_by_article(&self, article_id: &Uuid) -> Result<i64, AppError>;
    async fn newest_by_article(&self, article_id: &Uuid) -> Result<Option<CommentRow>, AppError>;
    async fn article_exists(&self, id: &Uuid) -> Result<bool, AppError>;
    async fn user_exists(&self, id: &Uuid) -> Result<bool, AppError>;
}

impl SqlxCommentRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxCommentRepo { pool }
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepo {
    async fn list_by_article(
        &self,
        article_id: &Uuid,
    ) -> Result<Vec<CommentWithUserRow>, AppError> {
        let comments = sqlx::query_as::<_, CommentWithUserRow>(
            r#"
            SELECT c.id, c.article_id, c.user_id, c.content, c.created_at, c.updated_at,
                   u.name AS user_name, u.email AS user_email
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.article_id = $1
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(article_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    async fn create_comment(
        &self,
        comment: &CommentInsert,
    ) -> Result<CommentWithUserRow, AppError> {
        // Insert and author join in one round trip
        let created = sqlx::query_as::<_, CommentWithUserRow>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (article_id, user_id, content, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, article_id, user_id, content, created_at, updated_at
            )
            SELECT i.id, i.article_id, i.user_id, i.content, i.created_at, i.updated_at,
                   u.name AS user_name, u.email AS user_email
            FROM inserted i
            JOIN users u ON u.id = i.user_id
            "#,
        )
        .bind(comment.article_id)
        .bind(comment.user_id)
        .bind(&comment.content)
        .bind(comment.created_at)
        .bind(comment.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn update_comment(&self, id: &Uuid, content: &str) -> Result<CommentRow, AppError> {
        let updated = sqlx::query_as::<_, CommentRow>(
            r#"
            UPDATE comments
            SET content = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, article_id, user_id, content, created_at, updated_at
            "#,
        )
        .bind(content)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Record not found".into()))?;

        Ok(updated)
    }

    async fn delete_comment(&self, id: &Uuid) -> Result<Uuid, AppError> {
        let article_id: Uuid = sqlx::query_scalar(
            r#"
            DELETE FROM comments
            WHERE id = $1
            RETURNING article_id
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Record not found".into()))?;

        Ok(article_id)
    }

    async fn count_by_article(&self, article_id: &Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM comments WHERE article_id = $1
            "#,
        )
        .bind(article_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn newest_by_article(&self, article_id: &Uuid) -> Result<Option<CommentRow>, AppError> {
        let newest = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, article_id, user_id, content, created_at, updated_at
            FROM comments
            WHERE article_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(article_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(newest)
    }

    async fn article_exists(&self, id: &Uuid) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (SELECT 1 FROM articles WHERE id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn user_exists(&self, id: &Uuid) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
