//! Session repository: opaque bearer tokens with absolute expiry
//!
//! Tokens carry no structure, so revocation and expiry live entirely in the
//! store: validation is one indexed lookup, logout is one delete, and a
//! periodic sweep reclaims expired rows.

use anyhow::Result;
use chrono::{Duration, Utc};
use rand::RngCore;
use sqlx::SqlitePool;
use tracing::info;

use crate::models::{AuthenticatedSession, Session};

/// Hours a freshly minted session stays valid. Expiry is fixed at creation;
/// there is no renewal or sliding window.
const SESSION_TTL_HOURS: i64 = 24;

/// Bytes of CSPRNG entropy behind each bearer token.
const TOKEN_BYTES: usize = 32;

/// Session repository
#[derive(Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    /// Create a new session repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Mint a session for the given user
    pub async fn create(&self, user_id: i64) -> Result<Session> {
        info!("Creating session for user: {}", user_id);

        let token = generate_token();
        let now = Utc::now();
        let expires_at = now + Duration::hours(SESSION_TTL_HOURS);

        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (user_id, token, expires_at, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, user_id, token, expires_at, created_at
            "#,
        )
        .bind(user_id)
        .bind(&token)
        .bind(expires_at)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(session)
    }

    /// Resolve a bearer token to its owning identity
    ///
    /// Returns `None` for unknown tokens, expired sessions, and deactivated
    /// owners alike. Expiry is re-checked live on every call rather than
    /// relying on the sweep having run.
    pub async fn validate(&self, token: &str) -> Result<Option<AuthenticatedSession>> {
        let session = sqlx::query_as::<_, AuthenticatedSession>(
            r#"
            SELECT u.id AS user_id, u.username, u.full_name, u.role, s.expires_at
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token = ? AND s.expires_at > ? AND u.is_active = 1
            "#,
        )
        .bind(token)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Delete the session behind a token
    ///
    /// Revoking an unknown or already revoked token is a no-op, so logout
    /// is idempotent.
    pub async fn revoke(&self, token: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Bulk-delete sessions whose expiry has passed; returns the number of
    /// rows removed. Safe to run concurrently with validations and with
    /// other sweeps.
    pub async fn sweep(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

/// 32 bytes of cryptographically secure randomness rendered as 64 lowercase
/// hex characters.
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(token, token.to_lowercase());
    }

    #[test]
    fn test_generated_tokens_are_unique() {
        assert_ne!(generate_token(), generate_token());
    }
}
