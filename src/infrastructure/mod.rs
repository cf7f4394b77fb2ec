//! Infrastructure layer for external integrations.
//!
//! Implements the persistence contract defined by the domain layer.
//!
//! # Modules
//!
//! - [`persistence`] - In-memory, PostgreSQL, Redis and DynamoDB user stores

pub mod persistence;
