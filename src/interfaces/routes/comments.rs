use actix_web::web;

use crate::handlers::comments;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/articles").service(
            web::resource("/{article_id}/comments")
                .route(web::get().to(comments::list_comments)),
        ),
    );

    cfg.service(
        web::scope("/comments")
            .service(web::resource("").route(web::post().to(comments::create_comment)))
            .service(
                web::resource("/{comment_id}")
                    .route(web::put().to(comments::update_comment))
                    .route(web::delete().to(comments::delete_comment)),
            ),
    );
}
