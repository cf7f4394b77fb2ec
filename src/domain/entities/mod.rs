//! Core domain entities.
//!
//! - [`User`] - A user record: a unique `username` plus an open attribute map

pub mod user;

pub use user::{Attributes, USERNAME_KEY, User, strip_username};
