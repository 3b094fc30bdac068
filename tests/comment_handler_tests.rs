use chrono::{Duration, Utc};
use mockall::{mock, predicate::*};
use uuid::Uuid;

use blog_backend::cache::stats_cache::StatsInvalidator;
use blog_backend::entities::comment::{
    CommentInsert, CommentRow, CommentWithUserRow, NewCommentRequest, UpdateCommentRequest,
};
use blog_backend::errors::AppError;
use blog_backend::repositories::comment::CommentRepository;
use blog_backend::use_cases::comments::CommentHandler;

// === Mock doubles ===

mock! {
    pub CommentRepo {}

    #[async_trait::async_trait]
    impl CommentRepository for CommentRepo {
        async fn list_by_article(&self, article_id: &Uuid) -> Result<Vec<CommentWithUserRow>, AppError>;
        async fn create_comment(&self, comment: &CommentInsert) -> Result<CommentWithUserRow, AppError>;
        async fn update_comment(&self, id: &Uuid, content: &str) -> Result<CommentRow, AppError>;
        async fn delete_comment(&self, id: &Uuid) -> Result<Uuid, AppError>;
        async fn count_by_article(&self, article_id: &Uuid) -> Result<i64, AppError>;
        async fn newest_by_article(&self, article_id: &Uuid) -> Result<Option<CommentRow>, AppError>;
        async fn article_exists(&self, id: &Uuid) -> Result<bool, AppError>;
        async fn user_exists(&self, id: &Uuid) -> Result<bool, AppError>;
    }
}

mock! {
    pub Invalidator {}

    #[async_trait::async_trait]
    impl StatsInvalidator for Invalidator {
        async fn invalidate_stats(&self);
    }
}

// === Row helpers ===

fn row_with_user(article_id: Uuid, user_id: Uuid, content: &str) -> CommentWithUserRow {
    let now = Utc::now();
    CommentWithUserRow {
        id: Uuid::new_v4(),
        article_id,
        user_id,
        content: content.to_string(),
        created_at: now,
        updated_at: now,
        user_name: "Ada".to_string(),
        user_email: "ada@example.com".to_string(),
    }
}

fn row(article_id: Uuid, content: &str) -> CommentRow {
    let now = Utc::now();
    CommentRow {
        id: Uuid::new_v4(),
        article_id,
        user_id: Uuid::new_v4(),
        content: content.to_string(),
        created_at: now,
        updated_at: now,
    }
}

// === TESTS ===

#[tokio::test]
async fn list_returns_comments_newest_first_with_author() {
    let article_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();

    let mut repo = MockCommentRepo::new();
    repo.expect_list_by_article()
        .with(eq(article_id))
        .returning(move |_| {
            let mut newer = row_with_user(article_id, user_id, "second");
            let mut older = row_with_user(article_id, user_id, "first");
            older.created_at = Utc::now() - Duration::hours(1);
            newer.created_at = Utc::now();
            Ok(vec![newer, older])
        });

    let handler = CommentHandler::new(repo, MockInvalidator::new());

    let comments = handler.list_comments(&article_id.to_string()).await.unwrap();

    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].content, "second");
    assert_eq!(comments[1].content, "first");
    assert!(comments[0].created_at >= comments[1].created_at);
    assert_eq!(comments[0].user.name, "Ada");
    assert_eq!(comments[0].user.email, "ada@example.com");
}

#[tokio::test]
async fn list_rejects_malformed_article_id() {
    let handler = CommentHandler::new(MockCommentRepo::new(), MockInvalidator::new());

    let result = handler.list_comments("not-a-uuid").await;

    assert!(matches!(result, Err(AppError::InvalidInput(_))));
}

#[tokio::test]
async fn create_escapes_content_before_persisting() {
    let article_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();

    let mut repo = MockCommentRepo::new();
    repo.expect_article_exists().returning(|_| Ok(true));
    repo.expect_user_exists().returning(|_| Ok(true));
    repo.expect_create_comment()
        .withf(|insert: &CommentInsert| {
            insert.content == "&lt;script&gt;alert(1)&lt;/script&gt;"
        })
        .returning(|insert| {
            Ok(row_with_user(insert.article_id, insert.user_id, &insert.content))
        });

    let mut stats = MockInvalidator::new();
    stats.expect_invalidate_stats().times(1).returning(|| ());

    let handler = CommentHandler::new(repo, stats);

    let created = handler
        .create_comment(NewCommentRequest {
            article_id,
            user_id,
            content: "<script>alert(1)</script>".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(created.content, "&lt;script&gt;alert(1)&lt;/script&gt;");
    assert_eq!(created.user.id, user_id);
}

#[tokio::test]
async fn create_missing_article_is_not_found() {
    let mut repo = MockCommentRepo::new();
    repo.expect_article_exists().returning(|_| Ok(false));

    let handler = CommentHandler::new(repo, MockInvalidator::new());

    let result = handler
        .create_comment(NewCommentRequest {
            article_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            content: "orphan comment".to_string(),
        })
        .await;

    match result {
        Err(AppError::NotFound(msg)) => assert_eq!(msg, "Article not found"),
        other => panic!("expected NotFound, got {:?}", other.map(|c| c.content)),
    }
}

#[tokio::test]
async fn create_missing_user_is_not_found() {
    let mut repo = MockCommentRepo::new();
    repo.expect_article_exists().returning(|_| Ok(true));
    repo.expect_user_exists().returning(|_| Ok(false));

    let handler = CommentHandler::new(repo, MockInvalidator::new());

    let result = handler
        .create_comment(NewCommentRequest {
            article_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            content: "ghost author".to_string(),
        })
        .await;

    match result {
        Err(AppError::NotFound(msg)) => assert_eq!(msg, "User not found"),
        other => panic!("expected NotFound, got {:?}", other.map(|c| c.content)),
    }
}

#[tokio::test]
async fn create_empty_content_fails_validation() {
    // No expectations: validation must fail before any repository call.
    let handler = CommentHandler::new(MockCommentRepo::new(), MockInvalidator::new());

    let result = handler
        .create_comment(NewCommentRequest {
            article_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            content: String::new(),
        })
        .await;

    assert!(matches!(result, Err(AppError::ValidationError(_))));
}

#[tokio::test]
async fn update_escapes_content_and_returns_comment() {
    let comment_id = Uuid::new_v4();
    let article_id = Uuid::new_v4();

    let mut repo = MockCommentRepo::new();
    repo.expect_update_comment()
        .withf(move |id: &Uuid, content: &str| {
            *id == comment_id && content == "Tom &amp; Jerry &#039;24"
        })
        .returning(move |_, content| Ok(row(article_id, content)));

    let mut stats = MockInvalidator::new();
    stats.expect_invalidate_stats().times(1).returning(|| ());

    let handler = CommentHandler::new(repo, stats);

    let updated = handler
        .update_comment(
            &comment_id.to_string(),
            &UpdateCommentRequest {
                content: "Tom & Jerry '24".to_string(),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.content, "Tom &amp; Jerry &#039;24");
}

#[tokio::test]
async fn update_unknown_comment_is_not_found() {
    let mut repo = MockCommentRepo::new();
    repo.expect_update_comment()
        .returning(|_, _| Err(AppError::NotFound("Record not found".to_string())));

    let handler = CommentHandler::new(repo, MockInvalidator::new());

    let result = handler
        .update_comment(
            &Uuid::new_v4().to_string(),
            &UpdateCommentRequest {
                content: "too late".to_string(),
            },
        )
        .await;

    match result {
        Err(AppError::NotFound(msg)) => assert_eq!(msg, "Comment not found"),
        other => panic!("expected NotFound, got {:?}", other.map(|c| c.content)),
    }
}

#[tokio::test]
async fn delete_reports_remaining_comments() {
    let comment_id = Uuid::new_v4();
    let article_id = Uuid::new_v4();

    let mut repo = MockCommentRepo::new();
    repo.expect_delete_comment()
        .with(eq(comment_id))
        .returning(move |_| Ok(article_id));
    repo.expect_count_by_article()
        .with(eq(article_id))
        .returning(|_| Ok(2));
    repo.expect_newest_by_article()
        .with(eq(article_id))
        .returning(move |_| Ok(Some(row(article_id, "still here"))));

    let mut stats = MockInvalidator::new();
    stats.expect_invalidate_stats().times(1).returning(|| ());

    let handler = CommentHandler::new(repo, stats);

    let response = handler.delete_comment(&comment_id.to_string()).await.unwrap();

    assert_eq!(response.message, "Comment deleted successfully");
    assert_eq!(response.remaining_count, 2);
    let first = response.first_remaining.expect("newest remaining comment");
    assert_eq!(first.content, "still here");
    assert_eq!(first.article_id, article_id);
}

#[tokio::test]
async fn delete_last_comment_reports_empty_article() {
    let comment_id = Uuid::new_v4();
    let article_id = Uuid::new_v4();

    let mut repo = MockCommentRepo::new();
    repo.expect_delete_comment()
        .returning(move |_| Ok(article_id));
    repo.expect_count_by_article().returning(|_| Ok(0));
    repo.expect_newest_by_article().returning(|_| Ok(None));

    let mut stats = MockInvalidator::new();
    stats.expect_invalidate_stats().times(1).returning(|| ());

    let handler = CommentHandler::new(repo, stats);

    let response = handler.delete_comment(&comment_id.to_string()).await.unwrap();

    assert_eq!(response.remaining_count, 0);
    assert!(response.first_remaining.is_none());
}

#[tokio::test]
async fn delete_unknown_comment_is_not_found() {
    let mut repo = MockCommentRepo::new();
    repo.expect_delete_comment()
        .returning(|_| Err(AppError::NotFound("Record not found".to_string())));

    let handler = CommentHandler::new(repo, MockInvalidator::new());

    let result = handler.delete_comment(&Uuid::new_v4().to_string()).await;

    match result {
        Err(AppError::NotFound(msg)) => assert_eq!(msg, "Comment not found"),
        other => panic!(
            "expected NotFound, got {:?}",
            other.map(|r| r.remaining_count)
        ),
    }
}
