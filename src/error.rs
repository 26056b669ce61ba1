//! # Error Handling
//!
//! Domain errors raised by the classroom services ([`ServiceError`]) and the
//! problem+json envelope returned over HTTP ([`ApiError`]), with trace ID
//! propagation.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use sea_orm::{
    DbErr, RuntimeErr, SqlErr,
    sqlx::{error::DatabaseError, sqlite::SqliteError},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::telemetry;

/// Errors raised by the classroom services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Missing or blank required input; raised before any write.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A row the caller expected to exist is absent.
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },
    /// Unique-key collision or lost lock race reported by the store,
    /// typically two concurrent first-time creations of the same email.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Any other failure from the store.
    #[error("storage error: {0}")]
    Storage(#[source] DbErr),
    /// A multi-step write failed after its first write.
    #[error("write failed during {step}: {source}")]
    PartialWrite {
        step: &'static str,
        #[source]
        source: Box<ServiceError>,
    },
}

impl ServiceError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Wraps an error raised after the first write of `step`.
    pub fn partial(step: &'static str, source: ServiceError) -> Self {
        match source {
            already @ Self::PartialWrite { .. } => already,
            other => Self::PartialWrite {
                step,
                source: Box::new(other),
            },
        }
    }

    /// True when the same request may succeed if simply retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Conflict(_) => true,
            Self::PartialWrite { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// The underlying cause once a partial write has been rolled back.
    pub fn resolved(self) -> Self {
        match self {
            Self::PartialWrite { step, source } => {
                tracing::debug!(step, "partial write rolled back");
                source.resolved()
            }
            other => other,
        }
    }
}

impl From<DbErr> for ServiceError {
    fn from(error: DbErr) -> Self {
        if is_unique_violation(&error) {
            tracing::debug!(?error, "Unique constraint violation detected");
            return Self::Conflict(error.to_string());
        }
        if is_lock_contention(&error) {
            tracing::debug!(?error, "Lock contention detected");
            return Self::Conflict(error.to_string());
        }
        Self::Storage(error)
    }
}

/// Detects unique-key violations across the supported backends.
pub fn is_unique_violation(error: &DbErr) -> bool {
    const PG_UNIQUE: &str = "23505";
    const SQLITE_DUPLICATE_CODES: &[&str] = &["1555", "2067"];

    if matches!(error.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return true;
    }

    let Some(db_error) = database_error(error) else {
        return false;
    };

    if db_error.is_unique_violation() {
        return true;
    }

    db_error
        .code()
        .is_some_and(|code| code == PG_UNIQUE || SQLITE_DUPLICATE_CODES.contains(&code.as_ref()))
}

/// Detects writers that lost a lock race: SQLite `BUSY`/`LOCKED` (any
/// extended code), Postgres serialization failures and deadlocks.
pub fn is_lock_contention(error: &DbErr) -> bool {
    const PG_CONTENTION_CODES: &[&str] = &["40001", "40P01"];
    const SQLITE_BUSY: i32 = 5;
    const SQLITE_LOCKED: i32 = 6;

    let Some(db_error) = database_error(error) else {
        return false;
    };
    let Some(code) = db_error.code() else {
        return false;
    };

    if db_error.try_downcast_ref::<SqliteError>().is_some() {
        // Extended result codes keep the primary code in the low byte.
        return code
            .parse::<i32>()
            .is_ok_and(|extended| matches!(extended & 0xff, SQLITE_BUSY | SQLITE_LOCKED));
    }

    PG_CONTENTION_CODES.contains(&code.as_ref())
}

fn database_error(error: &DbErr) -> Option<&(dyn DatabaseError + 'static)> {
    match error {
        DbErr::Query(RuntimeErr::SqlxError(sqlx_err))
        | DbErr::Exec(RuntimeErr::SqlxError(sqlx_err)) => sqlx_err.as_database_error(),
        _ => None,
    }
}

/// Unified API error response structure
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiError {
    /// HTTP status code for the response
    #[serde(skip_serializing, skip_deserializing)]
    pub status: StatusCode,
    /// Error code for programmatic handling
    pub code: Box<str>,
    /// Human-readable error message
    pub message: Box<str>,
    /// Additional error details (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Box<serde_json::Value>>,
    /// Suggested retry delay in seconds (optional)
    pub retry_after: Option<u64>,
    /// Correlation trace ID for debugging (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<Box<str>>,
}

impl ApiError {
    /// Create a new API error with the given status code and message
    pub fn new<S: Into<String>>(status: StatusCode, code: S, message: S) -> Self {
        Self {
            status,
            code: code.into().into_boxed_str(),
            message: message.into().into_boxed_str(),
            details: None,
            retry_after: None,
            trace_id: Self::current_trace_id(),
        }
    }

    /// Add details to the error
    pub fn with_details<V: Into<serde_json::Value>>(mut self, details: V) -> Self {
        self.details = Some(Box::new(details.into()));
        self
    }

    /// Set retry after delay
    pub fn with_retry_after(mut self, seconds: u64) -> Self {
        self.retry_after = Some(seconds);
        self
    }

    /// Trace ID of the current request, or a generated correlation ID outside one.
    fn current_trace_id() -> Option<Box<str>> {
        telemetry::current_trace_id()
            .map(|trace_id| trace_id.into_boxed_str())
            .or_else(|| {
                Some(format!("corr-{}", &uuid::Uuid::new_v4().to_string()[..8]).into_boxed_str())
            })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert(
            "content-type",
            HeaderValue::from_static("application/problem+json"),
        );

        if let Some(retry_after) = self.retry_after
            && let Ok(header_value) = HeaderValue::from_str(&retry_after.to_string())
        {
            headers.insert("retry-after", header_value);
        }

        (self.status, headers, axum::Json(self)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let message = match rejection {
            JsonRejection::JsonDataError(err) => format!("Invalid JSON: {}", err),
            JsonRejection::JsonSyntaxError(err) => format!("JSON syntax error: {}", err),
            JsonRejection::MissingJsonContentType(_) => {
                "Missing 'Content-Type: application/json' header".to_string()
            }
            _ => "Invalid request body".to_string(),
        };

        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", &message)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "VALIDATION_FAILED",
            &format!("Invalid query string: {}", rejection.body_text()),
        )
    }
}

impl From<DbErr> for ApiError {
    fn from(error: DbErr) -> Self {
        ServiceError::from(error).into()
    }
}

impl From<ServiceError> for ApiError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::InvalidArgument(message) => {
                Self::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", &message)
            }
            ServiceError::NotFound { kind, key } => Self::new(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                &format!("{} not found: {}", kind, key),
            ),
            ServiceError::Conflict(_) => Self::new(
                StatusCode::CONFLICT,
                "CONFLICT",
                "Concurrent write to the same resource; retry the request",
            )
            .with_retry_after(1),
            ServiceError::Storage(DbErr::RecordNotFound(record)) => Self::new(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                &format!("Record not found: {}", record),
            ),
            ServiceError::Storage(DbErr::Conn(connection_err)) => {
                tracing::error!("Database connection error: {:?}", connection_err);
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    "Database service unavailable",
                )
            }
            ServiceError::Storage(other) => {
                tracing::error!("Database error: {:?}", other);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    "Database error occurred",
                )
            }
            ServiceError::PartialWrite { step, source } => {
                tracing::debug!(step, "partial write surfaced to the HTTP layer");
                Self::from(*source)
            }
        }
    }
}

/// Create a validation error with field details
pub fn validation_error(message: &str, field_errors: serde_json::Value) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", message).with_details(field_errors)
}
