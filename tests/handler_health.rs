mod common;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::Value;
use std::sync::Arc;
use user_management::domain::entities::{Attributes, User};
use user_management::domain::repositories::{StoreError, StoreResult, UserStore};

/// Store whose backend is always down.
struct UnreachableStore;

#[async_trait]
impl UserStore for UnreachableStore {
    async fn put(&self, _user: &User) -> StoreResult<()> {
        Err(StoreError::Connection("connection refused".into()))
    }

    async fn patch(&self, _username: &str, _attributes: &Attributes) -> StoreResult<Option<User>> {
        Err(StoreError::Connection("connection refused".into()))
    }

    async fn fetch(&self, _username: &str) -> StoreResult<Option<User>> {
        Err(StoreError::Connection("connection refused".into()))
    }

    async fn remove(&self, _username: &str) -> StoreResult<()> {
        Err(StoreError::Connection("connection refused".into()))
    }

    async fn health_check(&self) -> StoreResult<()> {
        Err(StoreError::Connection("connection refused".into()))
    }

    fn backend_name(&self) -> &'static str {
        "unreachable"
    }
}

fn unreachable_server() -> TestServer {
    let state = common::create_test_state_with_store(Arc::new(UnreachableStore));
    TestServer::new(common::create_test_router(state)).unwrap()
}

#[tokio::test]
async fn test_health_endpoint_success() {
    let server = common::create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["storage"]["status"], "ok");
    assert_eq!(json["checks"]["storage"]["backend"], "memory");
    assert_eq!(json["checks"]["storage"]["message"], "memory reachable");
}

#[tokio::test]
async fn test_health_endpoint_structure() {
    let server = common::create_test_server();

    let json = server.get("/health").await.json::<Value>();

    assert!(json.get("status").is_some());
    assert!(json.get("version").is_some());
    assert!(json["checks"].get("storage").is_some());
}

#[tokio::test]
async fn test_health_endpoint_backend_down() {
    let server = unreachable_server();

    let response = server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let json = response.json::<Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["storage"]["status"], "error");
    assert_eq!(json["checks"]["storage"]["backend"], "unreachable");
}

#[tokio::test]
async fn test_backend_failure_surfaces_as_server_error() {
    let server = unreachable_server();

    let response = server.get("/users/john").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        response.json::<Value>()["error"]["code"],
        "service_unavailable"
    );
}
