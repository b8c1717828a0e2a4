//! User repository for database operations

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::models::{NewUser, User};

/// Username of the account seeded at startup.
const SEED_ADMIN_USERNAME: &str = "admin";
/// Well-known bootstrap password; meant to be changed after first login.
const SEED_ADMIN_PASSWORD: &str = "admin123";

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user
    ///
    /// The password is hashed before it reaches the database. Username and
    /// email collisions surface as unique-constraint errors from the insert
    /// itself; there is no pre-check, so concurrent registrations cannot
    /// race past it.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        info!("Creating new user: {}", new_user.username);

        // Hash the password
        let salt = SaltString::generate(&mut rand::thread_rng());
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(new_user.password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
            .to_string();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, full_name, role, is_active, created_at)
            VALUES (?, ?, ?, ?, 'admin', 1, ?)
            RETURNING id, username, email, password_hash, full_name, role, is_active,
                      created_at, last_login_at
            "#,
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&password_hash)
        .bind(&new_user.full_name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find an active user by username. Deactivated accounts are invisible
    /// to authentication.
    pub async fn find_active_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, full_name, role, is_active,
                   created_at, last_login_at
            FROM users
            WHERE username = ? AND is_active = 1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Verify a user's password
    ///
    /// A mismatch is an `Ok(false)`, not an error; only a malformed stored
    /// hash fails.
    pub async fn verify_password(&self, user: &User, password: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;

        let argon2 = Argon2::default();
        let result = argon2.verify_password(password.as_bytes(), &parsed_hash);

        Ok(result.is_ok())
    }

    /// Stamp the user's last successful authentication time
    pub async fn touch_last_login(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE users SET last_login_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Seed the default admin account if and only if it does not exist yet.
    /// A lost race against a concurrent seed surfaces as a unique-constraint
    /// error for the caller to log and ignore.
    pub async fn ensure_seed_admin(&self) -> Result<()> {
        let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE username = ?")
            .bind(SEED_ADMIN_USERNAME)
            .fetch_optional(&self.pool)
            .await?;

        if existing.is_some() {
            return Ok(());
        }

        self.create(&NewUser {
            username: SEED_ADMIN_USERNAME.to_string(),
            email: "admin@bulletin.local".to_string(),
            password: SEED_ADMIN_PASSWORD.to_string(),
            full_name: "Administrator".to_string(),
        })
        .await?;

        warn!("Seeded default admin account; change its password after first login");
        Ok(())
    }
}
