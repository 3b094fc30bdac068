use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{errors::AppError, AppState};

#[instrument(skip(state))]
pub async fn get_stats(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let stats_handler = &state.stats_handler;

    let stats = stats_handler.get_stats().await?;
    Ok(HttpResponse::Ok().json(stats))
}
