//! Middleware for bearer token validation and authentication

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use tracing::error;

use crate::{error::ApiError, state::AppState};

/// Authenticated identity attached to the request after token validation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub role: String,
}

/// Authentication middleware
///
/// Runs in front of every mutating route. A missing or malformed header and
/// an unknown, expired, or revoked token all map to the same 401; only a
/// storage failure during validation is a 500.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    // Extract the Authorization header
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(ApiError::Unauthenticated)?;

    // Check that it's a Bearer token
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthenticated)?;

    // Resolve the token to a live session
    let session = state
        .session_repository
        .validate(token)
        .await
        .map_err(|e| {
            error!("Failed to validate token: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::Unauthenticated)?;

    let user = AuthUser {
        id: session.user_id,
        username: session.username,
        full_name: session.full_name,
        role: session.role,
    };

    // Insert the user into the request extensions for downstream handlers
    req.extensions_mut().insert(user);

    // Call the next service
    Ok(next.run(req).await)
}
