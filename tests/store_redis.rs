//! Redis store tests. Need a live server at `REDIS_URL`.

use serde_json::json;
use serial_test::serial;
use user_management::config::RedisConfig;
use user_management::domain::entities::{Attributes, User};
use user_management::domain::repositories::UserStore;
use user_management::infrastructure::persistence::RedisUserStore;

fn attrs(value: serde_json::Value) -> Attributes {
    value.as_object().cloned().unwrap()
}

async fn connect() -> RedisUserStore {
    let config = RedisConfig {
        redis_url: std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".into()),
        key_prefix: "test:user:".to_string(),
    };
    RedisUserStore::connect(&config).await.unwrap()
}

#[tokio::test]
#[serial]
#[ignore = "requires REDIS_URL"]
async fn test_put_and_fetch_preserves_types() {
    let store = connect().await;
    let user = User::new(
        "redis-john",
        attrs(json!({ "email": "j@example.com", "age": 30, "admin": false, "tags": ["x"] })),
    );

    store.put(&user).await.unwrap();

    assert_eq!(store.fetch("redis-john").await.unwrap(), Some(user));
    store.remove("redis-john").await.unwrap();
}

#[tokio::test]
#[serial]
#[ignore = "requires REDIS_URL"]
async fn test_put_drops_stale_fields() {
    let store = connect().await;

    store
        .put(&User::new("redis-stale", attrs(json!({ "email": "j@example.com" }))))
        .await
        .unwrap();
    store
        .put(&User::new("redis-stale", attrs(json!({ "age": 31 }))))
        .await
        .unwrap();

    let fetched = store.fetch("redis-stale").await.unwrap().unwrap();
    assert_eq!(fetched.attributes(), &attrs(json!({ "age": 31 })));
    store.remove("redis-stale").await.unwrap();
}

#[tokio::test]
#[serial]
#[ignore = "requires REDIS_URL"]
async fn test_patch_merges_and_rejects_missing() {
    let store = connect().await;
    store
        .put(&User::new("redis-patch", attrs(json!({ "email": "j@example.com", "age": 30 }))))
        .await
        .unwrap();

    let patched = store
        .patch("redis-patch", &attrs(json!({ "email": "new@example.com" })))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        patched.attributes(),
        &attrs(json!({ "email": "new@example.com", "age": 30 }))
    );

    let missing = store
        .patch("redis-ghost", &attrs(json!({ "email": "x@example.com" })))
        .await
        .unwrap();
    assert_eq!(missing, None);
    assert_eq!(store.fetch("redis-ghost").await.unwrap(), None);

    store.remove("redis-patch").await.unwrap();
}

#[tokio::test]
#[serial]
#[ignore = "requires REDIS_URL"]
async fn test_health_check() {
    let store = connect().await;

    assert!(store.health_check().await.is_ok());
    assert_eq!(store.backend_name(), "redis");
}
