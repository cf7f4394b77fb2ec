//! Domain layer: the user record and the persistence contract.
//!
//! - [`entities`] - The [`entities::User`] record and merge-patch rules
//! - [`repositories`] - The [`repositories::UserStore`] backend trait
//!
//! The domain layer has no dependencies on infrastructure or presentation layers.

pub mod entities;
pub mod repositories;
