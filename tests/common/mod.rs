#![allow(dead_code)]

use axum::extract::Request;
use axum::{Router, ServiceExt, routing::get};
use axum_test::TestServer;
use serde_json::{Value, json};
use std::sync::Arc;
use user_management::api::handlers::health_handler;
use user_management::api::routes::user_routes;
use user_management::application::services::UserService;
use user_management::domain::repositories::UserStore;
use user_management::infrastructure::persistence::MemoryUserStore;
use user_management::routes::app_router;
use user_management::state::AppState;

pub fn create_test_state() -> AppState {
    create_test_state_with_store(Arc::new(MemoryUserStore::new()))
}

pub fn create_test_state_with_store(store: Arc<dyn UserStore>) -> AppState {
    AppState::new(Arc::new(UserService::new(store)))
}

pub fn create_test_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .merge(user_routes())
        .with_state(state)
}

/// Test server over a fresh in-memory store.
pub fn create_test_server() -> TestServer {
    TestServer::new(create_test_router(create_test_state())).unwrap()
}

/// Test server over the production router, middleware included.
pub fn create_app_server(state: AppState) -> TestServer {
    TestServer::new(ServiceExt::<Request>::into_make_service(app_router(state))).unwrap()
}

pub async fn create_test_user(server: &TestServer, username: &str, attributes: Value) -> Value {
    let mut body = json!({ "username": username });
    if let (Some(body), Some(extra)) = (body.as_object_mut(), attributes.as_object()) {
        body.extend(extra.clone());
    }

    let response = server.post("/users").json(&body).await;
    response.assert_status_ok();
    response.json::<Value>()
}
