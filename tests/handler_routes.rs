mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
async fn test_trailing_slash_on_collection() {
    let server = common::create_app_server(common::create_test_state());

    let response = server
        .post("/users/")
        .json(&json!({ "username": "john", "email": "j@example.com" }))
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({ "username": "john", "email": "j@example.com" }));
}

#[tokio::test]
async fn test_trailing_slash_on_record() {
    let server = common::create_app_server(common::create_test_state());
    common::create_test_user(&server, "john", json!({ "age": 30 })).await;

    let response = server.get("/users/john/").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["age"], 30);

    let response = server
        .put("/users/john/")
        .json(&json!({ "age": 31 }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["age"], 31);

    server.delete("/users/john/").await.assert_status_ok();
    server
        .get("/users/john")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_percent_encoded_username() {
    let server = common::create_app_server(common::create_test_state());
    common::create_test_user(&server, "a/b", json!({})).await;

    let response = server.get("/users/a%2Fb/").await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["username"], "a/b");
}

#[tokio::test]
async fn test_health_through_app_router() {
    let server = common::create_app_server(common::create_test_state());

    let response = server.get("/health/").await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "healthy");
}

#[tokio::test]
async fn test_unknown_route() {
    let server = common::create_app_server(common::create_test_state());

    server
        .get("/accounts/john")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
