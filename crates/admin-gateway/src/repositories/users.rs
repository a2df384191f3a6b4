//! User and collection storage
//!
//! Handlers depend on the [`UserStore`] trait; [`PgUserStore`] is the
//! PostgreSQL implementation over the shared pool.

use anyhow::{Context, Result};
use async_trait::async_trait;
use shared::models::{Collection, User};
use shared::DbPool;
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a new non-admin user
    async fn create(&self, username: &str, email: &str, password_hash: &str) -> Result<User>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn username_exists(&self, username: &str) -> Result<bool>;

    async fn email_exists(&self, email: &str) -> Result<bool>;

    async fn update_last_login(&self, user_id: &str) -> Result<()>;

    /// All users, newest first
    async fn list(&self) -> Result<Vec<User>>;

    async fn count(&self, collection: Collection) -> Result<i64>;

    async fn count_admins(&self) -> Result<i64>;

    /// Connectivity probe for health checks
    async fn ping(&self) -> Result<()>;
}

/// Column behind a UNIQUE violation on `users`, if that is what failed
fn duplicate_field(err: &sqlx::Error) -> Option<&'static str> {
    let db_err = err.as_database_error()?;
    if !db_err.is_unique_violation() {
        return None;
    }
    match db_err.constraint() {
        Some(name) if name.contains("username") => Some("username"),
        Some(name) if name.contains("email") => Some("email"),
        _ => None,
    }
}

/// PostgreSQL-backed store
pub struct PgUserStore {
    pool: DbPool,
}

impl PgUserStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, username: &str, email: &str, password_hash: &str) -> Result<User> {
        let user_id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, password_hash, is_admin, created_at, updated_at)
            VALUES ($1, $2, $3, $4, false, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&user_id)
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match duplicate_field(&e) {
            // Lost a race with a concurrent registration
            Some(field) => anyhow::Error::new(shared::Error::conflict(field)),
            None => anyhow::Error::new(e).context("Failed to create user"),
        })?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find user by email")?;

        Ok(user)
    }

    async fn username_exists(&self, username: &str) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)
            "#,
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .context("Failed to check if username exists")?;

        Ok(exists)
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)
            "#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .context("Failed to check if email exists")?;

        Ok(exists)
    }

    async fn update_last_login(&self, user_id: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET last_login_at = $1
            WHERE id = $2
            "#,
        )
        .bind(chrono::Utc::now())
        .bind(user_id)
        .execute(&self.pool)
        .await
        .context("Failed to update last login")?;

        Ok(())
    }

    async fn list(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list users")?;

        Ok(users)
    }

    async fn count(&self, collection: Collection) -> Result<i64> {
        // Table names come from a closed enum, never from request input
        let sql = format!("SELECT COUNT(*) FROM {}", collection.table_name());

        let count = sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("Failed to count {}", collection.table_name()))?;

        Ok(count)
    }

    async fn count_admins(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM users WHERE is_admin = true
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to count admins")?;

        Ok(count)
    }

    async fn ping(&self) -> Result<()> {
        shared::db::check_health(&self.pool)
            .await
            .context("Database health check failed")
    }
}
