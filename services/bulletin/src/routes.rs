//! Bulletin service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};

use crate::{
    error::ApiError,
    middleware::{AuthUser, auth_middleware},
    models::{EventData, EventType, NewUser, UserResponse},
    state::AppState,
    validation,
};

/// Request for user registration
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Request for user login
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Response for user login
#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Create the router for the bulletin service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/auth/verify", get(verify))
        .route("/api/auth/logout", post(logout))
        .route("/api/events", post(create_event))
        .route("/api/events/:id", put(update_event).delete(delete_event))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/events", get(list_events))
        .route("/api/events/type/:type", get(list_events_by_type))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match common::database::health_check(&state.db_pool).await {
        Ok(true) => "up",
        _ => "down",
    };

    Json(json!({
        "status": "ok",
        "service": "bulletin",
        "database": database
    }))
}

/// User registration endpoint
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validation::validate_username(&payload.username).map_err(ApiError::Validation)?;
    validation::validate_email(&payload.email).map_err(ApiError::Validation)?;
    validation::validate_password(&payload.password).map_err(ApiError::Validation)?;
    validation::validate_full_name(&payload.full_name).map_err(ApiError::Validation)?;

    let new_user = NewUser {
        username: payload.username,
        email: payload.email,
        password: payload.password,
        full_name: payload.full_name,
    };

    let user = state
        .user_repository
        .create(&new_user)
        .await
        .map_err(ApiError::from_identity_insert)?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// User login endpoint
///
/// An unknown username and a wrong password produce the same rejection, so
/// the response carries no signal about which usernames exist.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.username.is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation(
            "Username and password are required".to_string(),
        ));
    }

    info!("Login attempt for user: {}", payload.username);

    let user = state
        .user_repository
        .find_active_by_username(&payload.username)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::InvalidCredentials)?;

    let verified = state
        .user_repository
        .verify_password(&user, &payload.password)
        .await
        .map_err(|e| {
            error!("Failed to verify password: {}", e);
            ApiError::InternalServerError
        })?;

    if !verified {
        return Err(ApiError::InvalidCredentials);
    }

    let session = state
        .session_repository
        .create(user.id)
        .await
        .map_err(|e| {
            error!("Failed to create session: {}", e);
            ApiError::InternalServerError
        })?;

    // Last-login stamping is best effort and must not fail the login.
    let user_repository = state.user_repository.clone();
    let user_id = user.id;
    tokio::spawn(async move {
        if let Err(e) = user_repository.touch_last_login(user_id).await {
            warn!("Failed to stamp last login for user {}: {}", user_id, e);
        }
    });

    Ok((
        StatusCode::OK,
        Json(LoginResponse {
            token: session.token,
            user: UserResponse::from(user),
        }),
    ))
}

/// Return the identity behind the presented token
pub async fn verify(Extension(user): Extension<AuthUser>) -> impl IntoResponse {
    Json(json!({ "user": user }))
}

/// Logout endpoint
///
/// The token was already validated by the middleware; revoking it again
/// after it raced another logout is harmless.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthenticated)?;

    state.session_repository.revoke(token).await.map_err(|e| {
        error!("Failed to revoke session: {}", e);
        ApiError::InternalServerError
    })?;

    Ok(Json(json!({ "message": "Logged out successfully" })))
}

/// List all events, public
pub async fn list_events(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let events = state.event_repository.list_all().await.map_err(|e| {
        error!("Failed to list events: {}", e);
        ApiError::InternalServerError
    })?;

    Ok(Json(events))
}

/// List events of a single type, public
pub async fn list_events_by_type(
    State(state): State<AppState>,
    Path(event_type): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let events = state
        .event_repository
        .list_by_type(&event_type)
        .await
        .map_err(|e| {
            error!("Failed to list events by type: {}", e);
            ApiError::InternalServerError
        })?;

    Ok(Json(events))
}

/// Create a new event attributed to the authenticated identity
pub async fn create_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<EventData>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .event_type
        .parse::<EventType>()
        .map_err(ApiError::Validation)?;

    let event = state
        .event_repository
        .create(&payload, user.id)
        .await
        .map_err(|e| {
            error!("Failed to create event: {}", e);
            ApiError::InternalServerError
        })?;

    Ok((StatusCode::CREATED, Json(event)))
}

/// Update an event by ID
///
/// Any authenticated identity may edit any event; the admin pool is shared
/// and there is deliberately no per-creator ownership check.
pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<EventData>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .event_type
        .parse::<EventType>()
        .map_err(ApiError::Validation)?;

    let event = state
        .event_repository
        .update(id, &payload)
        .await
        .map_err(|e| {
            error!("Failed to update event: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?;

    Ok(Json(event))
}

/// Delete an event by ID
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state.event_repository.delete(id).await.map_err(|e| {
        error!("Failed to delete event: {}", e);
        ApiError::InternalServerError
    })?;

    if deleted {
        Ok(Json(json!({ "message": "Event deleted successfully" })))
    } else {
        Err(ApiError::NotFound("Event not found".to_string()))
    }
}
