use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::comment::{NewCommentRequest, UpdateCommentRequest},
    errors::AppError,
    AppState,
};

#[instrument(skip(article_id, state))]
pub async fn list_comments(
    article_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let comment_handler = &state.comment_handler;

    let comments = comment_handler.list_comments(&article_id).await?;
    Ok(HttpResponse::Ok().json(comments))
}

#[instrument(skip(state, data))]
pub async fn create_comment(
    state: web::Data<AppState>,
    data: web::Json<NewCommentRequest>,
) -> Result<impl Responder, AppError> {
    let comment_handler = &state.comment_handler;

    let comment = comment_handler.create_comment(data.into_inner()).await?;
    Ok(HttpResponse::Created().json(comment))
}

#[instrument(skip(comment_id, state, data))]
pub async fn update_comment(
    comment_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<UpdateCommentRequest>,
) -> Result<impl Responder, AppError> {
    let comment_handler = &state.comment_handler;

    let comment = comment_handler
        .update_comment(&comment_id, &data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(comment))
}

#[instrument(skip(comment_id, state))]
pub async fn delete_comment(
    comment_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let comment_handler = &state.comment_handler;

    let response = comment_handler.delete_comment(&comment_id).await?;
    Ok(HttpResponse::Ok().json(response))
}
