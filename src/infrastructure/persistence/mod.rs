//! User store implementations and the backend factory.
//!
//! # Stores
//!
//! - [`MemoryUserStore`] - In-process map
//! - [`PgUserStore`] - PostgreSQL JSONB table
//! - [`RedisUserStore`] - Redis hashes
//! - `DynamoUserStore` - DynamoDB table (feature `dynamo`)

#[cfg(feature = "dynamo")]
pub mod dynamo_user_store;
pub mod memory_user_store;
pub mod pg_user_store;
pub mod redis_user_store;

#[cfg(feature = "dynamo")]
pub use dynamo_user_store::DynamoUserStore;
pub use memory_user_store::MemoryUserStore;
pub use pg_user_store::PgUserStore;
pub use redis_user_store::RedisUserStore;

use std::sync::Arc;

use crate::config::StorageConfig;
use crate::domain::repositories::{StoreResult, UserStore};

/// Builds the store selected by `config`.
///
/// # Errors
///
/// Returns a [`crate::domain::repositories::StoreError`] if the backend cannot be reached
/// or was not compiled in.
pub async fn connect(config: &StorageConfig) -> StoreResult<Arc<dyn UserStore>> {
    let store: Arc<dyn UserStore> = match config {
        StorageConfig::Memory => Arc::new(MemoryUserStore::new()),
        StorageConfig::Postgres(pg) => Arc::new(PgUserStore::connect(pg).await?),
        StorageConfig::Redis(redis) => Arc::new(RedisUserStore::connect(redis).await?),
        #[cfg(feature = "dynamo")]
        StorageConfig::DynamoDb(dynamo) => Arc::new(DynamoUserStore::connect(dynamo).await?),
        #[cfg(not(feature = "dynamo"))]
        StorageConfig::DynamoDb(_) => {
            return Err(crate::domain::repositories::StoreError::Connection(
                "DynamoDB support not compiled in (enable the `dynamo` feature)".to_string(),
            ));
        }
    };

    tracing::info!(backend = store.backend_name(), "User store ready");
    Ok(store)
}
