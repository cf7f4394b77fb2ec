//! # User Management
//!
//! A small CRUD service for user records, built with Axum over a pluggable
//! key-value backend.
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture principles with clear layer separation:
//!
//! - **Domain Layer** ([`domain`]) - The user record and the storage trait
//! - **Application Layer** ([`application`]) - The user service (record-level CRUD)
//! - **Infrastructure Layer** ([`infrastructure`]) - In-memory, PostgreSQL, Redis and DynamoDB stores
//! - **API Layer** ([`api`]) - REST handlers, DTOs, and middleware
//!
//! ## Endpoints
//!
//! ```text
//! POST   /users             {username, ...attrs}  -> 200 record | 400
//! PUT    /users/{username}  {...attrs}            -> 200 record | 404
//! GET    /users/{username}                        -> 200 record | 404
//! DELETE /users/{username}                        -> 200 message | 404
//! GET    /health
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! # In-memory backend, nothing else required
//! cargo run
//!
//! # DynamoDB
//! export STORAGE_BACKEND=dynamodb
//! export DYNAMODB_TABLE_NAME=Users
//! cargo run
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::UserService;
    pub use crate::domain::entities::{Attributes, User};
    pub use crate::domain::repositories::{StoreError, UserStore};
    pub use crate::error::AppError;
    pub use crate::infrastructure::persistence::MemoryUserStore;
    pub use crate::state::AppState;
}
