//! Session model and related functionality

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Session row: one live bearer-token grant. A session is live while
/// `expires_at` lies in the future and its owner is active; expiry is fixed
/// at creation and never slides.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A session joined to its owning identity, produced by token validation
#[derive(Debug, Clone, FromRow)]
pub struct AuthenticatedSession {
    pub user_id: i64,
    pub username: String,
    pub full_name: String,
    pub role: String,
    pub expires_at: DateTime<Utc>,
}
