use actix_web::{middleware::NormalizePath, web, App, HttpServer};
use blog_backend::{
    background_task::start_orphan_sweep,
    configure_routes,
    db::postgres::{create_pool, run_migrations},
    graceful_shutdown::shutdown_signal,
    settings::AppConfig,
    web::cors::build_cors,
    AppState,
};
use tracing_actix_web::TracingLogger;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let config = match AppConfig::new() {
        Ok(cfg) => {
            tracing::info!("Loaded configuration: {:?}", cfg);
            cfg
        },
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let pool = create_pool(&config.database_url)
        .await
        .expect("Failed to create database connection pool");

    run_migrations(&pool)
        .await
        .expect("Failed to apply database migrations");

    tokio::fs::create_dir_all(&config.storage_root)
        .await
        .expect("Failed to create storage root directory");

    let app_state = web::Data::new(
        AppState::new(&config, pool.clone())
    );

    let server_addr = format!("{}:{}", config.host, config.port);

    tracing::info!(
        "🚀 Starting Blog API v{} on {}",
        env!("CARGO_PKG_VERSION"),
        server_addr
    );

    let app_state_clone = app_state.clone();
    let cors_origins = config.cors_origins();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(TracingLogger::default())
            .wrap(NormalizePath::trim())
            .wrap(build_cors(&cors_origins))
            .configure(configure_routes)
    })
    .workers(config.worker_count)
    .bind(server_addr)?
    .run();

    tokio::spawn(start_orphan_sweep(
        app_state_clone.image_handler.image_set_repo.clone(),
        app_state_clone.storage.clone(),
    ));

    tokio::select! {
        res = server => res,
        _ = shutdown_signal() => Ok(()),
    }
}
