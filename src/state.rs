//! Shared application state injected into handlers.

use std::sync::Arc;

use crate::application::services::UserService;

/// State cloned into every request handler.
///
/// Holds only immutable handles; all mutable state lives in the backend.
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
}

impl AppState {
    pub fn new(user_service: Arc<UserService>) -> Self {
        Self { user_service }
    }
}
