//! Repository trait definitions for the domain layer.
//!
//! The [`UserStore`] trait is the persistence contract. Implementations live in
//! `crate::infrastructure::persistence`; a mock is generated via `mockall` for
//! unit tests.

pub mod user_store;

pub use user_store::{StoreError, StoreResult, UserStore};

#[cfg(test)]
pub use user_store::MockUserStore;
