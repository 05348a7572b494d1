use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Outcome of a failed repository operation, classified from the driver error.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("No matching row")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Conflict(sqlx::Error),

    #[error("Transient database failure: {0}")]
    Transient(sqlx::Error),

    #[error("Database error: {0}")]
    Internal(sqlx::Error),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => RepositoryError::NotFound,
            sqlx::Error::Database(db)
                if db.is_unique_violation()
                    || db.is_foreign_key_violation()
                    || db.is_check_violation() =>
            {
                RepositoryError::Conflict(e)
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => RepositoryError::Transient(e),
            _ => RepositoryError::Internal(e),
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Bodies are short plain text; driver detail only goes to the log.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request body: {0}")]
    Decode(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => AppError::NotFound("User not found".to_string()),
            RepositoryError::Conflict(e) => AppError::Conflict(e.to_string()),
            RepositoryError::Transient(e) => AppError::Unavailable(e.to_string()),
            RepositoryError::Internal(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Decode(detail) => {
                tracing::warn!("Rejected request body: {detail}");
                (StatusCode::BAD_REQUEST, "Invalid request body".to_string())
            }
            AppError::Conflict(detail) => {
                tracing::error!("Conflict: {detail}");
                (
                    StatusCode::CONFLICT,
                    "User conflicts with an existing record".to_string(),
                )
            }
            AppError::Unavailable(detail) => {
                tracing::error!("Database unavailable: {detail}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Database unavailable".to_string(),
                )
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
        };

        (status, format!("{message}\n")).into_response()
    }
}
