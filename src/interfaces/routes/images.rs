use actix_multipart::form::MultipartFormConfig;
use actix_web::web;

use crate::errors::AppError;
use crate::handlers::images;

/// Transport cap on the whole multipart body. Sits above the 10 MiB
/// business limit so an oversized-but-parseable upload still reaches
/// field-level validation instead of dying in the extractor.
const MULTIPART_TOTAL_LIMIT: usize = 12 * 1024 * 1024;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/images")
            .app_data(
                MultipartFormConfig::default()
                    .total_limit(MULTIPART_TOTAL_LIMIT)
                    .error_handler(|err, _req| AppError::from(err).into()),
            )
            .service(web::resource("").route(web::post().to(images::upload_image)))
            .service(web::resource("/delete").route(web::post().to(images::delete_image))),
    );
}
