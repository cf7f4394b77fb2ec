//! PostgreSQL implementation of the user store.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use std::sync::Arc;
use std::time::Duration;

use crate::config::PostgresConfig;
use crate::domain::entities::{Attributes, User};
use crate::domain::repositories::{StoreError, StoreResult, UserStore};

/// PostgreSQL repository for user records.
///
/// Rows live in the `users` table: `username` is the primary key and all other
/// attributes are one JSONB object. A patch is a single `UPDATE` using the
/// JSONB `||` operator, so it is atomic per row and never inserts.
pub struct PgUserStore {
    pool: Arc<PgPool>,
}

impl PgUserStore {
    /// Creates a new store over an existing connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Opens a pool from `config` and applies pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connection`] if the database is unreachable and
    /// [`StoreError::Operation`] if a migration fails.
    pub async fn connect(config: &PostgresConfig) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(|e| StoreError::Connection(format!("Failed to connect to PostgreSQL: {e}")))?;
        tracing::info!("Connected to PostgreSQL");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Operation(format!("Migration failed: {e}")))?;

        Ok(Self::new(Arc::new(pool)))
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn put(&self, user: &User) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (username, attributes)
            VALUES ($1, $2)
            ON CONFLICT (username) DO UPDATE SET attributes = EXCLUDED.attributes
            "#,
        )
        .bind(user.username())
        .bind(Json(user.attributes()))
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn patch(&self, username: &str, attributes: &Attributes) -> StoreResult<Option<User>> {
        let row: Option<(Json<Attributes>,)> = sqlx::query_as(
            r#"
            UPDATE users
            SET attributes = attributes || $2
            WHERE username = $1
            RETURNING attributes
            "#,
        )
        .bind(username)
        .bind(Json(attributes))
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(|(Json(attributes),)| User::new(username, attributes)))
    }

    async fn fetch(&self, username: &str) -> StoreResult<Option<User>> {
        let row: Option<(Json<Attributes>,)> =
            sqlx::query_as("SELECT attributes FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(self.pool.as_ref())
                .await?;

        Ok(row.map(|(Json(attributes),)| User::new(username, attributes)))
    }

    async fn remove(&self, username: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => StoreError::Connection(e.to_string()),
            _ => StoreError::Operation(e.to_string()),
        }
    }
}
