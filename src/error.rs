//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing reference: {kind} '{id}'")]
    MissingReference { kind: &'static str, id: String },
    #[error("invalid primary key: resource {resource} column {column}")]
    InvalidPrimaryKey { resource: String, column: String },
    #[error("duplicate path segment: {0}")]
    DuplicatePathSegment(String),
    #[error("config load: {0}")]
    Load(String),
    #[error("validation: {0}")]
    Validation(String),
    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),
    #[error("invalid value for {name}: '{value}'")]
    InvalidEnv { name: &'static str, value: String },
}

/// Outcome of a repository call that did not succeed.
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// No row matched the identifier (empty lookup or zero affected rows).
    #[error("no row with id {id}")]
    NotFound { id: i64 },
    #[error("database: {0}")]
    Infrastructure(#[from] sqlx::Error),
}

impl RepositoryError {
    /// Message reported by the database itself, if the failure came from the server.
    pub fn store_message(&self) -> Option<String> {
        match self {
            RepositoryError::Infrastructure(sqlx::Error::Database(db)) => Some(db.message().to_string()),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation: {0}")]
    Validation(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::BadRequest(_) => "bad_request",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::NotFound(_) => "not_found",
            AppError::MethodNotAllowed(_) => "method_not_allowed",
            AppError::PayloadTooLarge(_) => "payload_too_large",
            AppError::Internal(_) => "internal_error",
        }
    }

    /// Client-facing message, without the variant prefix used by Display.
    pub fn message(&self) -> String {
        match self {
            AppError::Validation(m)
            | AppError::BadRequest(m)
            | AppError::Unauthorized(m)
            | AppError::NotFound(m)
            | AppError::MethodNotAllowed(m)
            | AppError::PayloadTooLarge(m)
            | AppError::Internal(m) => m.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub code: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorBody {
            message: self.message(),
            code: self.code().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(AppError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Internal("x".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(AppError::MethodNotAllowed("x".into()).status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(AppError::PayloadTooLarge("x".into()).status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn message_has_no_variant_prefix() {
        let err = AppError::NotFound("Not found product with id 4.".into());
        assert_eq!(err.message(), "Not found product with id 4.");
        assert_eq!(err.to_string(), "not found: Not found product with id 4.");
    }

    #[test]
    fn only_server_errors_carry_a_store_message() {
        assert_eq!(RepositoryError::NotFound { id: 1 }.store_message(), None);
        assert_eq!(
            RepositoryError::Infrastructure(sqlx::Error::PoolTimedOut).store_message(),
            None
        );
    }
}
