//! PostgreSQL connection pool management
//!
//! Provides utilities for creating the connection pool and applying migrations.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use subtrack_core::config::DatabaseConfig;
use subtrack_core::{AppError, AppResult};
use tracing::{info, warn};

/// Create a PostgreSQL connection pool
///
/// The pool is verified with a `SELECT 1` round-trip before being returned.
///
/// # Example
///
/// ```no_run
/// use subtrack_core::config::DatabaseConfig;
/// use subtrack_db::create_pool;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig::with_url("postgresql://localhost/subtrack");
///     let pool = create_pool(&config).await?;
///     Ok(())
/// }
/// ```
pub async fn create_pool(config: &DatabaseConfig) -> AppResult<PgPool> {
    info!("Creating database connection pool");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(Some(config.idle_timeout()))
        .max_lifetime(Some(config.max_lifetime()))
        .test_before_acquire(true)
        .connect(&config.url)
        .await
        .map_err(|e| {
            warn!("Failed to create database pool: {}", e);
            AppError::Pool(format!("Failed to connect to database: {}", e))
        })?;

    info!(
        "Database pool created with {}..{} connections",
        config.min_connections, config.max_connections
    );

    // Test the connection
    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(|e| AppError::Database(format!("Database health check failed: {}", e)))?;

    info!("Database connection verified");

    Ok(pool)
}

/// Apply the embedded schema migrations
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    info!("Applying database migrations");

    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            warn!("Migration failed: {}", e);
            AppError::Migration(e.to_string())
        })?;

    info!("Database schema is up to date");
    Ok(())
}
