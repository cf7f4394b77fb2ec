//! User repository service: record-level CRUD over a [`UserStore`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::{Attributes, User, strip_username};
use crate::domain::repositories::{StoreError, StoreResult, UserStore};
use crate::error::AppError;

/// Default upper bound for a single backend call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Domain-level CRUD over user records.
///
/// Independent of the transport and of the storage technology: any
/// [`UserStore`] works. Existence checks (duplicate on create, missing on
/// update/delete) are the caller's job; this service only reports absence as
/// `None`.
///
/// Every backend call is bounded by a timeout and surfaces as
/// [`AppError::Unavailable`] when it expires.
pub struct UserService {
    store: Arc<dyn UserStore>,
    timeout: Duration,
}

impl UserService {
    /// Creates a new user service with the default timeout.
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self::with_timeout(store, DEFAULT_STORE_TIMEOUT)
    }

    pub fn with_timeout(store: Arc<dyn UserStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Builds the full record from `username` and `attributes` and stores it.
    ///
    /// Overwrites any existing record; returns what was stored.
    pub async fn create(&self, username: &str, attributes: Attributes) -> Result<User, AppError> {
        let user = User::new(username, attributes);
        self.bounded(self.store.put(&user)).await?;

        tracing::debug!(username, backend = self.store.backend_name(), "User stored");
        Ok(user)
    }

    /// Merge-patches an existing record.
    ///
    /// `username` is removed from the patch. An empty patch writes nothing and
    /// returns the current record.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(User))` with the record after the patch
    /// - `Ok(None)` if the record does not exist; nothing is created
    pub async fn update(
        &self,
        username: &str,
        attributes: Attributes,
    ) -> Result<Option<User>, AppError> {
        let patch = strip_username(attributes);
        if patch.is_empty() {
            return self.get(username).await;
        }

        let updated = self.bounded(self.store.patch(username, &patch)).await?;
        if updated.is_none() {
            tracing::debug!(username, "Patch skipped, user absent");
        }
        Ok(updated)
    }

    /// Fetches a record; absence is `Ok(None)`.
    pub async fn get(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self.bounded(self.store.fetch(username)).await?)
    }

    /// Removes a record. Removing an absent record succeeds.
    pub async fn delete(&self, username: &str) -> Result<(), AppError> {
        Ok(self.bounded(self.store.remove(username)).await?)
    }

    /// Probes the backend.
    pub async fn health_check(&self) -> Result<(), AppError> {
        Ok(self.bounded(self.store.health_check()).await?)
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    async fn bounded<T, F>(&self, call: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| StoreError::Timeout(self.timeout))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockUserStore;
    use async_trait::async_trait;
    use serde_json::{Value, json};

    fn attrs(value: Value) -> Attributes {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_create_merges_username_into_record() {
        let mut store = MockUserStore::new();
        store
            .expect_put()
            .withf(|user| user.username() == "john" && user.attributes()["email"] == "j@example.com")
            .times(1)
            .returning(|_| Ok(()));
        store.expect_backend_name().return_const("mock");

        let service = UserService::new(Arc::new(store));

        let user = service
            .create("john", attrs(json!({ "email": "j@example.com" })))
            .await
            .unwrap();

        assert_eq!(
            serde_json::to_value(&user).unwrap(),
            json!({ "username": "john", "email": "j@example.com" })
        );
    }

    #[tokio::test]
    async fn test_update_strips_username_from_patch() {
        let mut store = MockUserStore::new();
        store
            .expect_patch()
            .withf(|username, patch| {
                username == "john" && !patch.contains_key("username") && patch["email"] == "new"
            })
            .times(1)
            .returning(|username, patch| {
                let mut user = User::new(username, Attributes::new());
                user.merge(patch);
                Ok(Some(user))
            });

        let service = UserService::new(Arc::new(store));

        let updated = service
            .update("john", attrs(json!({ "username": "eve", "email": "new" })))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.username(), "john");
        assert_eq!(updated.attributes()["email"], "new");
    }

    #[tokio::test]
    async fn test_update_with_empty_patch_only_fetches() {
        let mut store = MockUserStore::new();
        store.expect_patch().times(0);
        store
            .expect_fetch()
            .times(1)
            .returning(|username| Ok(Some(User::new(username, Attributes::new()))));

        let service = UserService::new(Arc::new(store));

        let user = service
            .update("john", attrs(json!({ "username": "john" })))
            .await
            .unwrap();

        assert!(user.is_some());
    }

    #[tokio::test]
    async fn test_update_absent_returns_none() {
        let mut store = MockUserStore::new();
        store.expect_patch().times(1).returning(|_, _| Ok(None));

        let service = UserService::new(Arc::new(store));

        let result = service.update("ghost", attrs(json!({ "a": 1 }))).await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_get_absent_is_not_an_error() {
        let mut store = MockUserStore::new();
        store.expect_fetch().times(1).returning(|_| Ok(None));

        let service = UserService::new(Arc::new(store));

        assert!(service.get("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_backend_error_propagates() {
        let mut store = MockUserStore::new();
        store
            .expect_remove()
            .times(1)
            .returning(|_| Err(StoreError::Connection("refused".to_string())));

        let service = UserService::new(Arc::new(store));

        let result = service.delete("john").await;

        assert!(matches!(result, Err(AppError::Unavailable { .. })));
    }

    struct StalledStore;

    #[async_trait]
    impl UserStore for StalledStore {
        async fn put(&self, _user: &User) -> StoreResult<()> {
            std::future::pending().await
        }
        async fn patch(&self, _username: &str, _attributes: &Attributes) -> StoreResult<Option<User>> {
            std::future::pending().await
        }
        async fn fetch(&self, _username: &str) -> StoreResult<Option<User>> {
            std::future::pending().await
        }
        async fn remove(&self, _username: &str) -> StoreResult<()> {
            std::future::pending().await
        }
        async fn health_check(&self) -> StoreResult<()> {
            std::future::pending().await
        }
        fn backend_name(&self) -> &'static str {
            "stalled"
        }
    }

    #[tokio::test]
    async fn test_stalled_backend_times_out() {
        let service = UserService::with_timeout(Arc::new(StalledStore), Duration::from_millis(20));

        let result = service.get("john").await;

        assert!(matches!(result, Err(AppError::Unavailable { .. })));
    }
}
