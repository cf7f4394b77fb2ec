//! In-process user store.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::entities::{Attributes, User};
use crate::domain::repositories::{StoreResult, UserStore};

/// A [`UserStore`] backed by a `HashMap` behind a `RwLock`.
///
/// Each operation holds the lock for its whole duration, so single-item
/// writes are atomic. Nothing survives a restart.
///
/// # Use Cases
///
/// - Local development without external services
/// - Handler and service tests
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        debug!("Using in-memory user store");
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn put(&self, user: &User) -> StoreResult<()> {
        self.users
            .write()
            .await
            .insert(user.username().to_string(), user.clone());
        Ok(())
    }

    async fn patch(&self, username: &str, attributes: &Attributes) -> StoreResult<Option<User>> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(username).map(|user| {
            user.merge(attributes);
            user.clone()
        }))
    }

    async fn fetch(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn remove(&self, username: &str) -> StoreResult<()> {
        self.users.write().await.remove(username);
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
