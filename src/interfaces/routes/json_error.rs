use actix_web::{
    error::JsonPayloadError, http::StatusCode, web, HttpResponse, ResponseError,
};
use serde_json::json;

/// Replaces actix's default JSON extractor failures with the API's
/// `{"error": ...}` body shape.
pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default().error_handler(|err, _req| JsonError::from(err).into()),
    );
}

#[derive(Debug)]
pub struct JsonError {
    message: String,
    status: StatusCode,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ResponseError for JsonError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status).json(json!({ "error": self.message }))
    }
}

impl From<JsonPayloadError> for JsonError {
    fn from(err: JsonPayloadError) -> Self {
        let status = match &err {
            JsonPayloadError::ContentType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            _ => StatusCode::BAD_REQUEST,
        };
        JsonError {
            message: format!("JSON payload error: {}", err),
            status,
        }
    }
}
