//! Redis implementation of the user store.

use async_trait::async_trait;
use redis::{AsyncCommands, Client, RedisError, Script, aio::ConnectionManager};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::config::RedisConfig;
use crate::domain::entities::{Attributes, USERNAME_KEY, User};
use crate::domain::repositories::{StoreError, StoreResult, UserStore};

/// Overwrites fields of an existing hash and returns the whole hash.
/// Replies nil when the key is absent, so a patch never creates a record.
const PATCH_SCRIPT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 0 then
    return false
end
redis.call('HSET', KEYS[1], unpack(ARGV))
return redis.call('HGETALL', KEYS[1])
"#;

/// Redis repository for user records.
///
/// Each record is a hash at `{prefix}{username}` with one field per attribute
/// (the `username` field included). Field values are JSON-encoded so numbers,
/// booleans and nested values survive the round-trip.
pub struct RedisUserStore {
    client: ConnectionManager,
    key_prefix: String,
    patch_script: Script,
}

impl RedisUserStore {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connection`] if the URL is invalid, the connection cannot
    /// be established, or the PING fails.
    pub async fn connect(config: &RedisConfig) -> StoreResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(config.redis_url.as_str()).map_err(|e| {
            StoreError::Connection(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            StoreError::Connection(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| StoreError::Connection(format!("Redis PING failed: {}", e)))?;

        info!("Connected to Redis");

        Ok(Self {
            client: manager,
            key_prefix: config.key_prefix.clone(),
            patch_script: Script::new(PATCH_SCRIPT),
        })
    }

    fn build_key(&self, username: &str) -> String {
        format!("{}{}", self.key_prefix, username)
    }
}

#[async_trait]
impl UserStore for RedisUserStore {
    async fn put(&self, user: &User) -> StoreResult<()> {
        let key = self.build_key(user.username());
        let fields = encode_fields(user)?;
        let mut conn = self.client.clone();

        redis::pipe()
            .atomic()
            .del(&key)
            .ignore()
            .hset_multiple(&key, &fields)
            .ignore()
            .query_async::<()>(&mut conn)
            .await?;

        debug!(username = user.username(), "Redis PUT");
        Ok(())
    }

    async fn patch(&self, username: &str, attributes: &Attributes) -> StoreResult<Option<User>> {
        let mut fields = Vec::with_capacity(attributes.len());
        for (field, value) in attributes {
            if field != USERNAME_KEY {
                fields.push((field, encode_value(username, value)?));
            }
        }
        // HSET needs at least one pair.
        if fields.is_empty() {
            return self.fetch(username).await;
        }

        let key = self.build_key(username);
        let mut conn = self.client.clone();

        let mut invocation = self.patch_script.key(&key);
        for (field, value) in &fields {
            invocation.arg(*field).arg(value);
        }

        let reply: Option<Vec<String>> = invocation.invoke_async(&mut conn).await?;

        match reply {
            Some(flat) => decode_fields(username, pairs(flat)),
            None => Ok(None),
        }
    }

    async fn fetch(&self, username: &str) -> StoreResult<Option<User>> {
        let key = self.build_key(username);
        let mut conn = self.client.clone();

        let fields: HashMap<String, String> = conn.hgetall(&key).await?;
        decode_fields(username, fields)
    }

    async fn remove(&self, username: &str) -> StoreResult<()> {
        let key = self.build_key(username);
        let mut conn = self.client.clone();

        let deleted: i64 = conn.del(&key).await?;
        if deleted > 0 {
            debug!(username, "Redis DEL");
        }
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        let mut conn = self.client.clone();
        conn.ping::<()>().await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

impl From<RedisError> for StoreError {
    fn from(e: RedisError) -> Self {
        if e.is_io_error()
            || e.is_timeout()
            || e.is_connection_refusal()
            || e.is_connection_dropped()
        {
            StoreError::Connection(e.to_string())
        } else {
            StoreError::Operation(e.to_string())
        }
    }
}

fn encode_value(username: &str, value: &serde_json::Value) -> StoreResult<String> {
    serde_json::to_string(value).map_err(|e| StoreError::Corrupt {
        username: username.to_string(),
        reason: e.to_string(),
    })
}

/// Hash fields for a full record, `username` first.
fn encode_fields(user: &User) -> StoreResult<Vec<(String, String)>> {
    let mut fields = Vec::with_capacity(user.attributes().len() + 1);
    fields.push((
        USERNAME_KEY.to_string(),
        encode_value(user.username(), &serde_json::Value::from(user.username()))?,
    ));
    for (field, value) in user.attributes() {
        fields.push((field.clone(), encode_value(user.username(), value)?));
    }
    Ok(fields)
}

/// Rebuilds a record from a hash. An empty hash means the key is absent.
fn decode_fields(username: &str, fields: HashMap<String, String>) -> StoreResult<Option<User>> {
    if fields.is_empty() {
        return Ok(None);
    }

    let mut attributes = Attributes::new();
    for (field, raw) in fields {
        if field == USERNAME_KEY {
            continue;
        }
        let value = serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
            username: username.to_string(),
            reason: format!("field {field}: {e}"),
        })?;
        attributes.insert(field, value);
    }

    Ok(Some(User::new(username, attributes)))
}

/// Folds an `HGETALL`-style flat reply into field/value pairs.
fn pairs(flat: Vec<String>) -> HashMap<String, String> {
    let mut iter = flat.into_iter();
    let mut map = HashMap::new();
    while let (Some(field), Some(value)) = (iter.next(), iter.next()) {
        map.insert(field, value);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_fields_json_encodes_values() {
        let user = User::new(
            "john",
            json!({ "age": 30, "email": "j@example.com" })
                .as_object()
                .cloned()
                .unwrap(),
        );

        let fields = encode_fields(&user).unwrap();

        assert_eq!(fields[0], ("username".to_string(), "\"john\"".to_string()));
        assert!(fields.contains(&("age".to_string(), "30".to_string())));
        assert!(fields.contains(&("email".to_string(), "\"j@example.com\"".to_string())));
    }

    #[test]
    fn test_decode_empty_hash_is_absent() {
        assert!(decode_fields("john", HashMap::new()).unwrap().is_none());
    }

    #[test]
    fn test_decode_restores_types() {
        let fields = pairs(vec![
            "username".to_string(),
            "\"john\"".to_string(),
            "active".to_string(),
            "true".to_string(),
            "score".to_string(),
            "1.5".to_string(),
        ]);

        let user = decode_fields("john", fields).unwrap().unwrap();

        assert_eq!(
            serde_json::to_value(&user).unwrap(),
            json!({ "username": "john", "active": true, "score": 1.5 })
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let mut fields = HashMap::new();
        fields.insert("email".to_string(), "not json".to_string());

        let result = decode_fields("john", fields);

        assert!(matches!(result, Err(StoreError::Corrupt { .. })));
    }
}
