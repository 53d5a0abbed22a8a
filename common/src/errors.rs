// Error handling framework
// Lifecycle, session, and validation errors for the event store

use thiserror::Error;

/// Pool lifecycle errors
///
/// Raised while setting up or probing the pool; these are fatal at startup
/// and are never produced by a per-request [`Session`](crate::db::Session).
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Database health check failed: {0}")]
    HealthCheckFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

/// Errors crossing the Session/Repository boundary
///
/// Neither variant carries query text, parameters or driver messages. The
/// failing statement is logged where the error is produced.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// No connection could be acquired in time (pool exhausted or closed).
    #[error("database unavailable, try later")]
    Unavailable,

    /// Any other failure: malformed statement, constraint violation, decode error.
    #[error("internal error, try later")]
    Internal,
}

impl SessionError {
    /// Short label used for metrics and structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            SessionError::Unavailable => "unavailable",
            SessionError::Internal => "internal",
        }
    }

    /// Whether retrying the same operation later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, SessionError::Unavailable)
    }
}

/// Validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid field value for {field}: {reason}")]
    InvalidFieldValue { field: String, reason: String },
}

impl ValidationError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFieldValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// API response error type for HTTP responses
#[derive(Debug, serde::Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        let code = match err {
            SessionError::Unavailable => "SERVICE_UNAVAILABLE",
            SessionError::Internal => "INTERNAL_ERROR",
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        let details = match &err {
            ValidationError::MissingField(field) => serde_json::json!({ "field": field }),
            ValidationError::InvalidFieldValue { field, .. } => {
                serde_json::json!({ "field": field })
            }
        };
        ApiError::new("VALIDATION_ERROR", err.to_string()).with_details(details)
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        DatabaseError::ConnectionFailed(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for DatabaseError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DatabaseError::MigrationFailed(err.to_string())
    }
}

/// Collapse a driver error into the boundary error.
///
/// Acquisition failures become [`SessionError::Unavailable`]; everything else
/// is [`SessionError::Internal`].
impl From<&sqlx::Error> for SessionError {
    fn from(err: &sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => SessionError::Unavailable,
            _ => SessionError::Internal,
        }
    }
}
