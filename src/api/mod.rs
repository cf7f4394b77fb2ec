//! REST API layer for HTTP request/response handling.
//!
//! This layer translates HTTP requests into user service calls and formats
//! responses. It is the only place where errors become status codes.
//!
//! # Modules
//!
//! - [`dto`] - Data Transfer Objects for request/response serialization
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Request tracing
//! - [`routes`] - Route configuration

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
