//! Persistence backend contract for user records.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::entities::{Attributes, User};

/// Errors raised by a persistence backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be reached.
    #[error("storage connection error: {0}")]
    Connection(String),

    /// The backend was reached but rejected or failed the operation.
    #[error("storage operation error: {0}")]
    Operation(String),

    /// A stored item could not be decoded into a [`User`].
    #[error("corrupt record for user {username}: {reason}")]
    Corrupt { username: String, reason: String },

    /// The backend did not answer in time.
    #[error("storage call timed out after {0:?}")]
    Timeout(Duration),
}

/// Result type for backend operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Key-value backend holding user records, keyed by username.
///
/// Single-item writes are expected to be atomic; nothing else is guaranteed
/// across calls.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::MemoryUserStore`] - in-process map
/// - [`crate::infrastructure::persistence::PgUserStore`] - PostgreSQL JSONB table
/// - [`crate::infrastructure::persistence::RedisUserStore`] - Redis hashes
/// - `DynamoUserStore` - DynamoDB table (feature `dynamo`)
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Stores the full record, replacing whatever was stored under its username.
    async fn put(&self, user: &User) -> StoreResult<()>;

    /// Overwrites each attribute in `attributes` on an existing record.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(User))` with the record after the patch
    /// - `Ok(None)` if no record exists; nothing is created
    async fn patch(&self, username: &str, attributes: &Attributes) -> StoreResult<Option<User>>;

    /// Fetches a record by username.
    async fn fetch(&self, username: &str) -> StoreResult<Option<User>>;

    /// Deletes a record. Deleting an absent key succeeds.
    async fn remove(&self, username: &str) -> StoreResult<()>;

    /// Probes backend connectivity.
    async fn health_check(&self) -> StoreResult<()>;

    /// Short backend name for logs and health output.
    fn backend_name(&self) -> &'static str;
}
