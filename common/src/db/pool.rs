// PostgreSQL connection pool implementation
// Process-wide pool: created once at startup, closed once at shutdown

use crate::config::DatabaseConfig;
use crate::errors::DatabaseError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, instrument};

/// Database connection pool wrapper
///
/// Owns every physical connection. Cloning is cheap and shares the same pool;
/// the pool is handed explicitly to each [`Session`](crate::db::Session).
#[derive(Debug, Clone)]
pub struct DbPool {
    pool: PgPool,
}

impl DbPool {
    /// Create a new database connection pool sized `[min, max]`
    ///
    /// # Errors
    /// Returns `DatabaseError::ConnectionFailed` if unable to establish connection.
    /// Callers at startup must not swallow this.
    #[instrument(skip(config), fields(
        host = %config.host,
        database = %config.name,
        max_connections = config.max_connections,
        min_connections = config.min_connections,
    ))]
    pub async fn new(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        Self::connect(config, config.min_connections, config.max_connections).await
    }

    /// Create a pool with exactly `size` connections, ignoring configured bounds
    ///
    /// Used by test fixtures that need a predictable connection count.
    #[instrument(skip(config), fields(host = %config.host, database = %config.name))]
    pub async fn with_fixed_size(config: &DatabaseConfig, size: u32) -> Result<Self, DatabaseError> {
        Self::connect(config, size, size).await
    }

    async fn connect(
        config: &DatabaseConfig,
        min_connections: u32,
        max_connections: u32,
    ) -> Result<Self, DatabaseError> {
        info!(
            max_connections,
            min_connections, "Initializing database connection pool"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect_with(config.connect_options())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to create database pool");
                DatabaseError::ConnectionFailed(e.to_string())
            })?;

        info!(
            max_connections,
            min_connections, "Database connection pool initialized successfully"
        );

        Ok(Self { pool })
    }

    /// Get a reference to the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Perform a health check on the database connection
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Database health check failed");
                DatabaseError::HealthCheckFailed(e.to_string())
            })?;

        tracing::debug!("Database health check passed");
        Ok(())
    }

    /// Apply the bundled schema migrations
    #[instrument(skip(self))]
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        sqlx::migrate!("../migrations").run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Get the current number of connections in the pool
    pub fn size(&self) -> u32 {
        self.pool.size()
    }

    /// Get the number of idle connections in the pool
    pub fn num_idle(&self) -> usize {
        self.pool.num_idle()
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    /// Close the connection pool gracefully
    ///
    /// Waits for checked-out connections to be returned, then closes them.
    /// Call once, after all in-flight sessions have completed.
    #[instrument(skip(self))]
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
        info!("Database connection pool closed");
    }
}
