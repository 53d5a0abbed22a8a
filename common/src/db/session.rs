//! Session: the only path from repositories to the pool.
//!
//! A session either acquires a connection per call (pooled) or holds one
//! connection for its whole lifetime (pinned). Connections are RAII guards, so
//! they go back to the pool when a call returns, fails, or is cancelled.
//!
//! Every failure is logged together with the statement text and collapsed into
//! a [`SessionError`] that carries no driver or schema detail.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::time::Instant;

use metrics::{counter, histogram};
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgArguments, PgConnection, PgRow, Postgres};
use sqlx::query::{Query, QueryAs};
use sqlx::{Execute, FromRow};
use tokio::sync::{Mutex, MutexGuard};
use tracing::instrument;

use crate::db::DbPool;
use crate::errors::SessionError;

/// Outcome of a mutating statement, e.g. `DELETE 1`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusDescriptor {
    /// Leading SQL keyword of the statement, upper-cased
    pub command: String,
    pub rows_affected: u64,
}

impl StatusDescriptor {
    pub fn new(sql: &str, rows_affected: u64) -> Self {
        let command = sql
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_uppercase();
        Self {
            command,
            rows_affected,
        }
    }

    pub fn affected_exactly_one(&self) -> bool {
        self.rows_affected == 1
    }
}

impl fmt::Display for StatusDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.command, self.rows_affected)
    }
}

/// A connection borrowed for the duration of one call
enum Lease<'a> {
    Pinned(MutexGuard<'a, PoolConnection<Postgres>>),
    Pooled(PoolConnection<Postgres>),
}

impl Deref for Lease<'_> {
    type Target = PgConnection;

    fn deref(&self) -> &PgConnection {
        match self {
            Lease::Pinned(guard) => guard,
            Lease::Pooled(conn) => conn,
        }
    }
}

impl DerefMut for Lease<'_> {
    fn deref_mut(&mut self) -> &mut PgConnection {
        match self {
            Lease::Pinned(guard) => &mut *guard,
            Lease::Pooled(conn) => &mut *conn,
        }
    }
}

pub struct Session {
    pool: DbPool,
    pinned: Option<Mutex<PoolConnection<Postgres>>>,
}

impl Session {
    /// Session that acquires a connection for each call
    pub fn new(pool: &DbPool) -> Self {
        Self {
            pool: pool.clone(),
            pinned: None,
        }
    }

    /// Session that holds one connection until [`Session::release`] or drop
    ///
    /// Concurrent calls on the same pinned session run one after another.
    #[instrument(skip(pool))]
    pub async fn pinned(pool: &DbPool) -> Result<Self, SessionError> {
        let conn = pool.pool().acquire().await.map_err(|e| {
            let mapped = SessionError::from(&e);
            tracing::error!(error = %e, kind = mapped.kind(), "failed to pin connection");
            counter!("db_session_errors_total", "kind" => mapped.kind()).increment(1);
            mapped
        })?;

        Ok(Self {
            pool: pool.clone(),
            pinned: Some(Mutex::new(conn)),
        })
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned.is_some()
    }

    /// Return a pinned connection to the pool. No-op for pooled sessions.
    pub fn release(self) {
        drop(self);
    }

    /// Run a query and decode every returned row
    pub async fn fetch_rows<'q, T>(
        &self,
        query: QueryAs<'q, Postgres, T, PgArguments>,
    ) -> Result<Vec<T>, SessionError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = query.sql();
        let started = Instant::now();
        let mut conn = self.lease(sql).await?;
        let result = query.fetch_all(&mut *conn).await;
        drop(conn);
        self.finish(sql, started, result)
    }

    /// Run a query and decode the first row, if any
    pub async fn fetch_first<'q, T>(
        &self,
        query: QueryAs<'q, Postgres, T, PgArguments>,
    ) -> Result<Option<T>, SessionError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = query.sql();
        let started = Instant::now();
        let mut conn = self.lease(sql).await?;
        let result = query.fetch_optional(&mut *conn).await;
        drop(conn);
        self.finish(sql, started, result)
    }

    /// Run a mutating statement and report what it did
    pub async fn execute<'q>(
        &self,
        query: Query<'q, Postgres, PgArguments>,
    ) -> Result<StatusDescriptor, SessionError> {
        let sql = query.sql();
        let started = Instant::now();
        let mut conn = self.lease(sql).await?;
        let result = query.execute(&mut *conn).await;
        drop(conn);
        self.finish(sql, started, result)
            .map(|done| StatusDescriptor::new(sql, done.rows_affected()))
    }

    async fn lease(&self, sql: &str) -> Result<Lease<'_>, SessionError> {
        match &self.pinned {
            Some(conn) => Ok(Lease::Pinned(conn.lock().await)),
            None => match self.pool.pool().acquire().await {
                Ok(conn) => Ok(Lease::Pooled(conn)),
                Err(e) => Err(fail(sql, e)),
            },
        }
    }

    fn finish<R>(
        &self,
        sql: &str,
        started: Instant,
        result: Result<R, sqlx::Error>,
    ) -> Result<R, SessionError> {
        histogram!("db_query_duration_seconds").record(started.elapsed().as_secs_f64());
        result.map_err(|e| fail(sql, e))
    }
}

fn fail(sql: &str, err: sqlx::Error) -> SessionError {
    let mapped = SessionError::from(&err);
    tracing::error!(
        error = %err,
        kind = mapped.kind(),
        retryable = mapped.is_retryable(),
        query = %sql,
        "exception executing query"
    );
    counter!("db_session_errors_total", "kind" => mapped.kind()).increment(1);
    mapped
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("pinned", &self.is_pinned())
            .finish()
    }
}
