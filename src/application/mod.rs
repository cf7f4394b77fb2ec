//! Application layer services.
//!
//! Services consume the repository traits from [`crate::domain`] and provide a
//! transport-neutral API for HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::user_service::UserService`] - User record create, update, get and delete

pub mod services;
