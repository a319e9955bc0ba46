use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// One rejected input field. `field` is a path such as `exercises[0].sets[1].reps`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error taxonomy shared by the gateway, the data-access layer and the HTTP surface.
///
/// `Clone` is required because a single in-flight fetch hands its result to every
/// caller that was waiting on the same query key.
#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("validation failed: {} field error(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("permission denied")]
    PermissionDenied,

    #[error("{0} not found")]
    NotFound(String),

    #[error("service temporarily unavailable: {0}")]
    TransientIo(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation(vec![FieldError::new(field, message)])
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        AppError::NotFound(what.into())
    }

    pub fn internal(e: impl std::fmt::Display) -> Self {
        AppError::Internal(e.to_string())
    }

    /// Only transient I/O failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::TransientIo(_))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::PermissionDenied => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::TransientIo(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::PermissionDenied => "permission_denied",
            AppError::NotFound(_) => "not_found",
            AppError::TransientIo(_) => "service_unavailable",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Conflict(_) => "conflict",
            AppError::Internal(_) => "internal_error",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<FieldError>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let (message, details) = match self {
            AppError::Validation(details) => {
                let message = match details.as_slice() {
                    [only] => only.message.clone(),
                    many => format!("{} validation errors", many.len()),
                };
                (message, details)
            }
            AppError::Internal(msg) => {
                error!(error = %msg, "internal error");
                ("An internal error occurred".to_string(), Vec::new())
            }
            other => (other.to_string(), Vec::new()),
        };

        (
            status,
            Json(ErrorBody {
                error: code,
                message,
                details,
            }),
        )
            .into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::not_found("record"),
            sqlx::Error::Io(e) => AppError::TransientIo(e.to_string()),
            sqlx::Error::PoolTimedOut => AppError::TransientIo("database pool timed out".into()),
            sqlx::Error::PoolClosed => AppError::TransientIo("database pool closed".into()),
            sqlx::Error::WorkerCrashed => AppError::TransientIo("database worker crashed".into()),
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some("23505") => AppError::Conflict("record already exists".into()),
                _ => AppError::Internal(format!("database error: {}", db_err)),
            },
            other => AppError::Internal(format!("database error: {}", other)),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("document encoding: {}", err))
    }
}
