//! Event repository for database operations

use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::{Event, EventData, EventWithCreator};

/// Event repository
#[derive(Clone)]
pub struct EventRepository {
    pool: SqlitePool,
}

impl EventRepository {
    /// Create a new event repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All events, soonest first
    ///
    /// The left join keeps events whose creator row is gone; those carry a
    /// null creator username.
    pub async fn list_all(&self) -> Result<Vec<EventWithCreator>> {
        let events = sqlx::query_as::<_, EventWithCreator>(
            r#"
            SELECT e.id, e.title, e.description, e.date, e.time, e.type,
                   e.created_by, u.username AS created_by_username,
                   e.created_at, e.updated_at
            FROM events e
            LEFT JOIN users u ON u.id = e.created_by
            ORDER BY e.date, e.time
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Events of a single type, soonest first. A type string outside the
    /// closed set matches no rows and yields an empty list, not an error.
    pub async fn list_by_type(&self, event_type: &str) -> Result<Vec<EventWithCreator>> {
        let events = sqlx::query_as::<_, EventWithCreator>(
            r#"
            SELECT e.id, e.title, e.description, e.date, e.time, e.type,
                   e.created_by, u.username AS created_by_username,
                   e.created_at, e.updated_at
            FROM events e
            LEFT JOIN users u ON u.id = e.created_by
            WHERE e.type = ?
            ORDER BY e.date, e.time
            "#,
        )
        .bind(event_type)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Create a new event attributed to the given identity
    pub async fn create(&self, data: &EventData, creator_id: i64) -> Result<Event> {
        let now = Utc::now();

        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (title, description, date, time, type, created_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, title, description, date, time, type, created_by, created_at, updated_at
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.date)
        .bind(&data.time)
        .bind(&data.event_type)
        .bind(creator_id)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Overwrite an event's fields and stamp its update time
    ///
    /// `None` means no row with that id existed; the zero-rows case is an
    /// explicit outcome, not an error.
    pub async fn update(&self, id: i64, data: &EventData) -> Result<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET title = ?, description = ?, date = ?, time = ?, type = ?, updated_at = ?
            WHERE id = ?
            RETURNING id, title, description, date, time, type, created_by, created_at, updated_at
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.date)
        .bind(&data.time)
        .bind(&data.event_type)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Delete an event; returns false when no row with that id existed
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
