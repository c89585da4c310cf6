//! Typed errors and HTTP mapping.

use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
    #[error("unknown store backend: {0}")]
    UnknownBackend(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("{0} is already defined for another record")]
    DuplicateName(String),
    #[error("id {0} is already defined for another record")]
    DuplicateId(i32),
    #[error("{0} is required")]
    MissingRequiredField(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Store(StoreError::from(err))
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl AppError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::DuplicateName(_) => (StatusCode::BAD_REQUEST, "duplicate_name"),
            AppError::DuplicateId(_) => (StatusCode::BAD_REQUEST, "duplicate_id"),
            AppError::MissingRequiredField(_) => (StatusCode::BAD_REQUEST, "missing_required_field"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code, "request failed");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_bad_request() {
        for err in [
            AppError::DuplicateName("Dup".into()),
            AppError::DuplicateId(4),
            AppError::MissingRequiredField("name".into()),
        ] {
            assert_eq!(err.status_and_code().0, StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn unexpected_store_failure_is_server_error() {
        let err = AppError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.status_and_code(), (StatusCode::INTERNAL_SERVER_ERROR, "database_error"));
        assert_eq!(AppError::NotFound("9999".into()).status_and_code().0, StatusCode::NOT_FOUND);
        let taken_serial = AppError::Store(StoreError::Violation(crate::sql::ConstraintViolation::unique("topics_pkey")));
        assert_eq!(taken_serial.status_and_code().0, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
