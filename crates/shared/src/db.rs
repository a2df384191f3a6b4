//! Database connection handle
//!
//! The pool is created once at startup without opening a connection, shared
//! with request handlers as application data and closed when the server stops.

use crate::config::DatabaseConfig;
use crate::error::Result;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

/// Type alias for the database pool
pub type DbPool = PgPool;

/// Create a lazily connecting database pool
///
/// Connections are opened on first use, so startup does not fail when the
/// database is briefly unavailable.
///
/// # Errors
///
/// Returns an error if the connection URL cannot be parsed
pub fn create_pool(config: &DatabaseConfig) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect_lazy(&config.connection_url())?;

    tracing::info!(
        max_connections = config.max_connections,
        host = %config.host,
        "Database pool created (lazy connect)"
    );

    Ok(pool)
}

/// Check database connection health
///
/// # Errors
///
/// Returns an error if the connection check fails
pub async fn check_health(pool: &DbPool) -> Result<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Close every pooled connection
///
/// Waits for checked-out connections to be returned.
pub async fn close_pool(pool: &DbPool) {
    pool.close().await;
    tracing::info!("Database pool closed");
}
