//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use arena_db::DbError;

/// API Error types
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Tied scores are not allowed in this format")]
    InvalidTie,

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("User is already registered for this tournament")]
    DuplicateRegistration,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error")]
    Internal,
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::InvalidState(_) => (StatusCode::CONFLICT, "invalid_state"),
            ApiError::InvalidTie => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_tie"),
            ApiError::InvalidTransition(_) => (StatusCode::CONFLICT, "invalid_transition"),
            ApiError::CapacityExceeded(_) => (StatusCode::CONFLICT, "capacity_exceeded"),
            ApiError::DuplicateRegistration => (StatusCode::CONFLICT, "duplicate_registration"),
            ApiError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            ApiError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            ApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(what) => ApiError::NotFound(what),
            DbError::Duplicate(_) => ApiError::DuplicateRegistration,
            other => {
                tracing::error!("database error: {other}");
                ApiError::Database(other.to_string())
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<arena_bracket::BracketError> for ApiError {
    fn from(err: arena_bracket::BracketError) -> Self {
        ApiError::InvalidState(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_duplicate_maps_to_duplicate_registration() {
        let err: ApiError = DbError::Duplicate("participant".into()).into();
        assert!(matches!(err, ApiError::DuplicateRegistration));
    }

    #[test]
    fn db_not_found_maps_to_not_found() {
        let err: ApiError = DbError::NotFound("match 42".into()).into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
