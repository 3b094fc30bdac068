use actix_web::web;

use crate::handlers::home::home;
use crate::handlers::stats;
use crate::handlers::storage;
use crate::handlers::system::health_check;

mod comments;
mod images;
mod json_error;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(home);
    cfg.service(health_check);

    cfg.service(web::resource("/stats").route(web::get().to(stats::get_stats)));
    cfg.service(web::resource("/storage/{key:.*}").route(web::get().to(storage::serve_blob)));

    cfg.configure(comments::config_routes);
    cfg.configure(images::config_routes);

    cfg.configure(json_error::config_routes);
}
