use validator::Validate;

use crate::cache::stats_cache::StatsInvalidator;
use crate::entities::comment::{
    CommentDeletedResponse, CommentInsert, CommentResponse, CommentWithUserResponse,
    NewCommentRequest, UpdateCommentRequest,
};
use crate::errors::AppError;
use crate::repositories::comment::CommentRepository;
use crate::utils::html::escape_html;
use crate::utils::valid_uuid::valid_uuid;

pub struct CommentHandler<R, S>
where
    R: CommentRepository,
    S: StatsInvalidator,
{
    pub comment_repo: R,
    pub stats: S,
}

impl<R, S> CommentHandler<R, S>
where
    R: CommentRepository,
    S: StatsInvalidator,
{
    pub fn new(comment_repo: R, stats: S) -> Self {
        CommentHandler {
            comment_repo,
            stats,
        }
    }

    /// Lists an article's comments, newest first, authors attached.
    /// An article with no comments (or an unknown article) yields an
    /// empty list.
    pub async fn list_comments(
        &self,
        article_id: &str,
    ) -> Result<Vec<CommentWithUserResponse>, AppError> {
        let article_id = valid_uuid(article_id)?;
        let rows = self.comment_repo.list_by_article(&article_id).await?;
        Ok(rows.into_iter().map(CommentWithUserResponse::from).collect())
    }

    /// Creates a comment after checking the referenced article and user
    /// exist. Content is stored HTML-escaped.
    pub async fn create_comment(
        &self,
        request: NewCommentRequest,
    ) -> Result<CommentWithUserResponse, AppError> {
        let insert = CommentInsert::from(request);
        insert.validate()?;

        if !self.comment_repo.article_exists(&insert.article_id).await? {
            return Err(AppError::NotFound("Article not found".to_string()));
        }
        if !self.comment_repo.user_exists(&insert.user_id).await? {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        let row = self.comment_repo.create_comment(&insert).await?;
        self.stats.invalidate_stats().await;

        Ok(row.into())
    }

    /// Replaces a comment's content, escaping it the same way create
    /// does.
    pub async fn update_comment(
        &self,
        id: &str,
        request: &UpdateCommentRequest,
    ) -> Result<CommentResponse, AppError> {
        request.validate()?;
        let id = valid_uuid(id)?;

        let content = escape_html(&request.content);
        let row = self
            .comment_repo
            .update_comment(&id, &content)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => AppError::NotFound("Comment not found".to_string()),
                _ => e,
            })?;
        self.stats.invalidate_stats().await;

        Ok(row.into())
    }

    /// Deletes a comment and reports what is left on its article: the
    /// remaining count and the newest remaining comment, if any.
    pub async fn delete_comment(&self, id: &str) -> Result<CommentDeletedResponse, AppError> {
        let id = valid_uuid(id)?;

        let article_id = self
            .comment_repo
            .delete_comment(&id)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => AppError::NotFound("Comment not found".to_string()),
                _ => e,
            })?;

        let remaining_count = self.comment_repo.count_by_article(&article_id).await?;
        let first_remaining = self
            .comment_repo
            .newest_by_article(&article_id)
            .await?
            .map(CommentResponse::from);
        self.stats.invalidate_stats().await;

        Ok(CommentDeletedResponse {
            message: "Comment deleted successfully".to_string(),
            remaining_count,
            first_remaining,
        })
    }
}
