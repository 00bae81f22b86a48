use std::time::Duration;

use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    Connection, PgConnection, PgPool,
};

use crate::{
    config::PoolSettings,
    error::{AppError, AppResult},
};

/// Idle connections are closed after this long
const IDLE_TIMEOUT: Duration = Duration::from_secs(600);

fn parse_options(database_url: &str) -> AppResult<PgConnectOptions> {
    database_url
        .parse()
        .map_err(|e| AppError::Connection(format!("invalid database URL: {}", e)))
}

fn pool_with_options(options: PgConnectOptions, settings: &PoolSettings) -> PgPool {
    // sqlx retires idle connections by age, not by count; `max_idle_connections`
    // is validated and reported but no connections are held open as a floor.
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(0)
        .idle_timeout(IDLE_TIMEOUT)
        .acquire_timeout(settings.acquire_timeout)
        .connect_lazy_with(options)
}

/// Creates a PostgreSQL connection pool without opening a connection
///
/// The URL is parsed eagerly so a malformed string fails here. Reachability is
/// checked separately by [`verify_connection`].
pub fn create_pool(database_url: &str, settings: &PoolSettings) -> AppResult<PgPool> {
    let options = parse_options(database_url)?;
    Ok(pool_with_options(options, settings))
}

/// Opens one direct connection and pings the server over it
///
/// Bypasses the pool so a refused or failing connection surfaces its own error
/// at once instead of retrying until the acquire timeout.
pub async fn verify_connection(options: &PgConnectOptions) -> AppResult<()> {
    let mut conn = PgConnection::connect_with(options)
        .await
        .map_err(|e| AppError::Connection(format!("unable to connect to database: {}", e)))?;

    conn.ping()
        .await
        .map_err(|e| AppError::Connection(format!("database ping failed: {}", e)))?;

    if let Err(e) = conn.close().await {
        tracing::debug!(error = %e, "Closing verification connection failed");
    }

    Ok(())
}

/// Verifies the database answers, then creates the pool
pub async fn connect(database_url: &str, settings: &PoolSettings) -> AppResult<PgPool> {
    let options = parse_options(database_url)?;
    verify_connection(&options).await?;

    let pool = pool_with_options(options, settings);

    tracing::info!(
        max_connections = settings.max_connections,
        max_idle_connections = settings.max_idle_connections,
        "Database connection verified"
    );

    Ok(pool)
}

/// Closes every pooled connection and waits for them to be released
pub async fn close_pool(pool: &PgPool) {
    pool.close().await;
    tracing::debug!("Database pool closed");
}
