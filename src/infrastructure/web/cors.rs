use actix_cors::Cors;
use actix_web::http::header;

/// Builds the CORS policy from the configured origin list. A literal
/// `*` entry opens the API to any origin; configuration rejects that
/// combination in production.
pub fn build_cors(origins: &[String]) -> Cors {
    let cors = if origins.iter().any(|origin| origin == "*") {
        Cors::default().allow_any_origin()
    } else {
        origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
        .max_age(3600)
}
