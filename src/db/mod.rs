//! Postgres pool setup. Migrations run here, before the router is built, so
//! every handler can assume the current schema.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Connect to `database_url` and bring the schema up to date.
///
/// # Errors
///
/// Fails when the database is unreachable or a migration does not apply.
pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await?;

    let migrator = sqlx::migrate!("src/db/migrations");
    migrator.run(&pool).await?;
    tracing::info!(migrations = migrator.iter().count(), max_connections, "database ready");

    Ok(pool)
}
