//! Application state shared across handlers

use sqlx::SqlitePool;

use crate::repositories::{EventRepository, SessionRepository, UserRepository};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub user_repository: UserRepository,
    pub session_repository: SessionRepository,
    pub event_repository: EventRepository,
}
