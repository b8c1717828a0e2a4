//! Event model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Closed set of calendar entry types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Assignment,
    Webinar,
    Workshop,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Assignment => "assignment",
            EventType::Webinar => "webinar",
            EventType::Workshop => "workshop",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assignment" => Ok(EventType::Assignment),
            "webinar" => Ok(EventType::Webinar),
            "workshop" => Ok(EventType::Workshop),
            _ => Err("Type must be one of assignment, webinar, workshop".to_string()),
        }
    }
}

/// Calendar entry row. `date` (`YYYY-MM-DD`) and `time` (`HH:MM`) are opaque
/// zero-padded strings; both are fixed-width, so lexicographic comparison
/// orders them chronologically.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub event_type: String,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Event row joined with the creator's username for display. A missing
/// creator row yields a null username, never a dropped event.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EventWithCreator {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub event_type: String,
    pub created_by: Option<i64>,
    pub created_by_username: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Incoming payload for event creation and update
#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default, rename = "type")]
    pub event_type: String,
}
