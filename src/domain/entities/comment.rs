use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::utils::html::escape_html;

// ───── Database Models ───────────────────────────────────────────────

#[derive(Debug, sqlx::FromRow)]
pub struct CommentRow {
    pub id: Uuid,
    pub article_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Comment joined with its author, as produced by the list and create
/// queries.
#[derive(Debug, sqlx::FromRow)]
pub struct CommentWithUserRow {
    pub id: Uuid,
    pub article_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_name: String,
    pub user_email: String,
}

#[derive(Debug, Validate)]
pub struct CommentInsert {
    pub article_id: Uuid,
    pub user_id: Uuid,

    #[validate(length(min = 1, message = "Content cannot be empty"))]
    pub content: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ───── API Response Models ──────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub article_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct CommentWithUserResponse {
    pub id: Uuid,
    pub article_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: UserSummary,
}

#[derive(Debug, Serialize)]
pub struct CommentDeletedResponse {
    pub message: String,
    pub remaining_count: i64,
    pub first_remaining: Option<CommentResponse>,
}

// ───── Input & Validation Requests ──────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct NewCommentRequest {
    pub article_id: Uuid,
    pub user_id: Uuid,

    #[validate(length(min = 1, message = "Content cannot be empty"))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    #[validate(length(min = 1, message = "Content cannot be empty"))]
    pub content: String,
}

// ───── Conversions ──────────────────────────────────────────────────

impl From<NewCommentRequest> for CommentInsert {
    fn from(req: NewCommentRequest) -> Self {
        let now = Utc::now();
        CommentInsert {
            article_id: req.article_id,
            user_id: req.user_id,
            // Stored escaped; rendering never has to trust comment text.
            content: escape_html(&req.content),
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<CommentRow> for CommentResponse {
    fn from(row: CommentRow) -> Self {
        CommentResponse {
            id: row.id,
            article_id: row.article_id,
            user_id: row.user_id,
            content: row.content,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<CommentWithUserRow> for CommentWithUserResponse {
    fn from(row: CommentWithUserRow) -> Self {
        CommentWithUserResponse {
            id: row.id,
            article_id: row.article_id,
            user_id: row.user_id,
            content: row.content,
            created_at: row.created_at,
            updated_at: row.updated_at,
            user: UserSummary {
                id: row.user_id,
                name: row.user_name,
                email: row.user_email,
            },
        }
    }
}
