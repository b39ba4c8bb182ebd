use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::engine::EngineError;
use crate::services::query::QueryError;
use crate::storage::StoreError;

/// Application error types, mapped to HTTP responses at the boundary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ErrorDetail {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Store(e) => match e {
                StoreError::NotFound(..) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                StoreError::AlreadyExists(..) => (StatusCode::CONFLICT, "ALREADY_EXISTS"),
                StoreError::Duplicate(..) => (StatusCode::CONFLICT, "DUPLICATE_MAPPING"),
                StoreError::InvalidArgument(_) => (StatusCode::BAD_REQUEST, "INVALID_ARGUMENT"),
                StoreError::ParentMissing(..) => (StatusCode::BAD_REQUEST, "PARENT_MISSING"),
            },
            AppError::Query(e) => match e {
                QueryError::Parse(_) => (StatusCode::BAD_REQUEST, "PARSE_ERROR"),
                QueryError::Resolution(_) => (StatusCode::UNPROCESSABLE_ENTITY, "RESOLUTION_ERROR"),
                QueryError::ColumnMapping(_) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "COLUMN_MAPPING_ERROR")
                }
                QueryError::Generation(_) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "SQL_GENERATION_ERROR")
                }
                QueryError::Execution(_) => (StatusCode::BAD_GATEWAY, "EXECUTION_ERROR"),
            },
            AppError::Engine(_) => (StatusCode::BAD_GATEWAY, "EXECUTOR_ERROR"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::NotImplemented(_) => (StatusCode::NOT_IMPLEMENTED, "NOT_IMPLEMENTED"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let body = Json(ErrorResponse {
            error: ErrorDetail::new(code, self.to_string()),
        });
        (status, body).into_response()
    }
}

/// Convert anyhow::Error to AppError
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
