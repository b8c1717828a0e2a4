//! Custom error types for the bulletin service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Custom error type for the bulletin service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or missing request fields, caught before touching the store
    #[error("{0}")]
    Validation(String),

    /// Unique-constraint violation on registration
    #[error("{0}")]
    DuplicateKey(String),

    /// Login failure; unknown username and wrong password are
    /// indistinguishable to the caller
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Missing, malformed, expired, or revoked bearer token
    #[error("Unauthorized")]
    Unauthenticated,

    /// Mutation target does not exist
    #[error("{0}")]
    NotFound(String),

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] common::error::DatabaseError),
}

impl ApiError {
    /// Classify a failed identity insert. A unique-constraint violation names
    /// the colliding column in the driver message; that is the only reliable
    /// way to tell a username collision from an email collision without a
    /// check-then-act race. Anything else is an internal error.
    pub fn from_identity_insert(err: anyhow::Error) -> Self {
        if let Some(db_err) = err
            .downcast_ref::<sqlx::Error>()
            .and_then(|e| e.as_database_error())
        {
            if db_err.is_unique_violation() {
                let message = db_err.message();
                if message.contains("users.username") {
                    return ApiError::DuplicateKey("Username is already taken".to_string());
                }
                if message.contains("users.email") {
                    return ApiError::DuplicateKey("Email is already registered".to_string());
                }
                return ApiError::DuplicateKey(
                    "Username or email is already registered".to_string(),
                );
            }
        }

        error!("Failed to create user: {}", err);
        ApiError::InternalServerError
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Validation(msg) | ApiError::DuplicateKey(msg) => {
                (StatusCode::BAD_REQUEST, msg)
            }
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid username or password".to_string(),
            ),
            ApiError::Unauthenticated => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            ApiError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for bulletin service results
pub type ApiResult<T> = Result<T, ApiError>;
