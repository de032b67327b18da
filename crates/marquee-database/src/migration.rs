//! Database migration runner.

use sqlx::PgPool;
use tracing::info;

use marquee_core::error::{AppError, ErrorKind};

/// Run all pending database migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    info!("Running database migrations...");

    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to run migrations: {e}"),
                e,
            )
        })?;

    info!("Database migrations completed successfully");
    Ok(())
}

/// Drop the public schema and re-run all migrations.
///
/// Destroys all data; intended for the CLI `migrate reset` command only.
pub async fn reset_database(pool: &PgPool) -> Result<(), AppError> {
    info!("Resetting database schema...");

    sqlx::raw_sql("DROP SCHEMA public CASCADE; CREATE SCHEMA public;")
        .execute(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to drop schema: {e}"),
                e,
            )
        })?;

    run_migrations(pool).await
}
