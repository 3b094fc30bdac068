use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};
use std::path::Path;
use std::time::Duration;

const MAX_CONNECT_ATTEMPTS: u32 = 5;

/// Builds the connection pool, retrying with exponential backoff while
/// the database comes up.
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let mut attempt = 0;
    let mut backoff = Duration::from_secs(2);

    loop {
        match PgPoolOptions::new()
            .max_connections(20)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await
        {
            Ok(pool) => {
                info!("Database connection established.");
                return Ok(pool);
            }
            Err(e) if attempt < MAX_CONNECT_ATTEMPTS => {
                attempt += 1;
                warn!(
                    "Database unreachable (attempt {}/{}): {}. Retrying in {}s...",
                    attempt,
                    MAX_CONNECT_ATTEMPTS,
                    e,
                    backoff.as_secs()
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Applies any pending migrations from the `migrations/` directory.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations");
    let migrator = sqlx::migrate::Migrator::new(migrations_dir).await?;
    migrator.run(pool).await?;
    info!("Database migrations applied.");
    Ok(())
}
