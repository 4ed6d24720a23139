use std::time::Duration;

use secrecy::{ExposeSecret, Secret};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub async fn init_postgres_connection(
    database_url: &Secret<String>,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .min_connections(5)
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(8))
        .connect(database_url.expose_secret())
        .await
}

/// Bring the schema up to date
pub async fn run_migrations(database: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(database).await
}
