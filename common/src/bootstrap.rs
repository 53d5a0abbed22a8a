// Bootstrap utilities for binary initialization
// Pool setup at startup and teardown at shutdown, shared by the API binary and test fixtures

use crate::config::Settings;
use crate::db::DbPool;
use anyhow::{Context, Result};
use tracing::info;

/// Create the process-wide pool and prove it can reach the database
///
/// A failure here is fatal for the caller: the service must not start
/// without a working pool.
///
/// # Errors
/// Returns error if the pool cannot be created or the health check fails
#[tracing::instrument(skip(settings), fields(database = %settings.database.name))]
pub async fn setup(settings: &Settings) -> Result<DbPool> {
    info!("Initializing database pool");

    let db_pool = DbPool::new(&settings.database)
        .await
        .context("Failed to initialize database pool")?;

    db_pool
        .health_check()
        .await
        .context("Database health check failed after pool creation")?;

    info!(
        size = db_pool.size(),
        idle = db_pool.num_idle(),
        "Database pool initialized"
    );
    Ok(db_pool)
}

/// Close the pool once every in-flight session has finished
#[tracing::instrument(skip(db_pool))]
pub async fn teardown(db_pool: DbPool) {
    if db_pool.is_closed() {
        info!("Database pool already closed");
        return;
    }
    db_pool.close().await;
    info!("Database pool closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_setup_fails_on_unreachable_database() {
        let mut settings = Settings::default();
        settings.database.host = "127.0.0.1".to_string();
        settings.database.port = 1;
        settings.database.acquire_timeout_seconds = 1;

        let err = setup(&settings).await.unwrap_err();
        assert!(err.to_string().contains("Failed to initialize database pool"));
    }
}
