use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{errors::AppError, storage::blob::BlobStorage, AppState};

/// Serves stored blobs under `/storage/{key}`, the public namespace all
/// upload responses point at.
#[instrument(skip(key, state))]
pub async fn serve_blob(
    key: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let data = state.storage.read(&key).await?;

    // Sniff rather than trust the extension; the file came from a user.
    let content_type = infer::get(&data)
        .map(|kind| kind.mime_type())
        .unwrap_or("application/octet-stream");

    Ok(HttpResponse::Ok().content_type(content_type).body(data))
}
