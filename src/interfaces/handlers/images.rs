use actix_multipart::form::MultipartForm;
use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::image::{DeleteImageRequest, ImageUploadForm, UploadedImage},
    errors::AppError,
    AppState,
};

#[instrument(skip(state, form))]
pub async fn upload_image(
    state: web::Data<AppState>,
    form: MultipartForm<ImageUploadForm>,
) -> Result<impl Responder, AppError> {
    let image_handler = &state.image_handler;

    let file = form
        .into_inner()
        .image
        .ok_or_else(|| AppError::InvalidInput("No image provided".to_string()))?;

    // The extractor spooled the part to a temp file; pull it back into
    // memory for derivation.
    let bytes = tokio::fs::read(file.file.path())
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to read upload: {}", e)))?;

    let upload = UploadedImage {
        bytes,
        file_name: file.file_name,
    };

    let response = image_handler.upload_image(upload).await?;
    Ok(HttpResponse::Created().json(response))
}

#[instrument(skip(state, data))]
pub async fn delete_image(
    state: web::Data<AppState>,
    data: web::Json<DeleteImageRequest>,
) -> Result<impl Responder, AppError> {
    let image_handler = &state.image_handler;

    let response = image_handler.delete_image(data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}
