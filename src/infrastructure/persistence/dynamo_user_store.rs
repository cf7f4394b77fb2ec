//! DynamoDB implementation of the user store.
//!
//! Table layout:
//!
//! ```text
//! Partition key: username (S)
//! Other attributes: one DynamoDB attribute per record attribute
//!   string -> S, number -> N, bool -> BOOL, null -> NULL,
//!   array -> L, object -> M
//! ```

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::config::DynamoDbConfig;
use crate::domain::entities::{Attributes, USERNAME_KEY, User};
use crate::domain::repositories::{StoreError, StoreResult, UserStore};

type Item = HashMap<String, AttributeValue>;

/// DynamoDB repository for user records.
///
/// Patches are a single `UpdateItem` with a `SET` expression guarded by
/// `attribute_exists(username)`, so a patch on a missing key is rejected by
/// DynamoDB instead of creating a partial item.
pub struct DynamoUserStore {
    client: Client,
    table_name: String,
}

impl DynamoUserStore {
    /// Creates a store using the default AWS credential chain.
    ///
    /// `region` and `endpoint_url` in `config` override the SDK defaults
    /// (the endpoint override targets DynamoDB Local).
    pub async fn connect(config: &DynamoDbConfig) -> StoreResult<Self> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());

        if let Some(region) = &config.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        info!(table = %config.table_name, "DynamoDB client configured");

        Ok(Self::with_client(
            Client::new(&sdk_config),
            config.table_name.clone(),
        ))
    }

    /// Create with explicit client (for testing).
    pub fn with_client(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    fn key_value(username: &str) -> AttributeValue {
        AttributeValue::S(username.to_string())
    }
}

#[async_trait]
impl UserStore for DynamoUserStore {
    async fn put(&self, user: &User) -> StoreResult<()> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(to_item(user)))
            .send()
            .await
            .map_err(sdk_error)?;

        debug!(username = user.username(), "DynamoDB PutItem");
        Ok(())
    }

    async fn patch(&self, username: &str, attributes: &Attributes) -> StoreResult<Option<User>> {
        let Some(update) = PatchUpdate::build(attributes) else {
            return self.fetch(username).await;
        };

        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(USERNAME_KEY, Self::key_value(username))
            .update_expression(update.expression)
            .condition_expression(PATCH_CONDITION)
            .set_expression_attribute_names(Some(update.names))
            .set_expression_attribute_values(Some(update.values))
            .return_values(ReturnValue::AllNew)
            .send()
            .await;

        match result {
            Ok(output) => output
                .attributes()
                .map(|item| from_item(username, item))
                .transpose(),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_conditional_check_failed_exception()) =>
            {
                Ok(None)
            }
            Err(err) => Err(sdk_error(err)),
        }
    }

    async fn fetch(&self, username: &str) -> StoreResult<Option<User>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(USERNAME_KEY, Self::key_value(username))
            .consistent_read(true)
            .send()
            .await
            .map_err(sdk_error)?;

        output
            .item()
            .map(|item| from_item(username, item))
            .transpose()
    }

    async fn remove(&self, username: &str) -> StoreResult<()> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key(USERNAME_KEY, Self::key_value(username))
            .send()
            .await
            .map_err(sdk_error)?;

        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.client
            .describe_table()
            .table_name(&self.table_name)
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "dynamodb"
    }
}

/// Only an existing item may be patched.
const PATCH_CONDITION: &str = "attribute_exists(#pk)";

/// `SET` expression and placeholder maps for a patch `UpdateItem`.
#[derive(Debug)]
struct PatchUpdate {
    expression: String,
    names: HashMap<String, String>,
    values: Item,
}

impl PatchUpdate {
    /// Returns `None` when nothing is left to write once `username` is dropped.
    ///
    /// Placeholders are indexed (`#a0 = :v0`), so attribute names need not be
    /// valid expression tokens. `#pk` always names the partition key for
    /// [`PATCH_CONDITION`].
    fn build(attributes: &Attributes) -> Option<Self> {
        let mut names = HashMap::from([("#pk".to_string(), USERNAME_KEY.to_string())]);
        let mut values = Item::new();
        let mut assignments = Vec::with_capacity(attributes.len());

        for (i, (field, value)) in attributes
            .iter()
            .filter(|(field, _)| field.as_str() != USERNAME_KEY)
            .enumerate()
        {
            names.insert(format!("#a{i}"), field.clone());
            values.insert(format!(":v{i}"), to_attribute(value));
            assignments.push(format!("#a{i} = :v{i}"));
        }

        if assignments.is_empty() {
            return None;
        }

        Some(Self {
            expression: format!("SET {}", assignments.join(", ")),
            names,
            values,
        })
    }
}

fn sdk_error<E, R>(err: SdkError<E, R>) -> StoreError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let message = DisplayErrorContext(&err).to_string();
    match err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => {
            StoreError::Connection(message)
        }
        _ => StoreError::Operation(message),
    }
}

fn to_item(user: &User) -> Item {
    let mut item: Item = user
        .attributes()
        .iter()
        .map(|(field, value)| (field.clone(), to_attribute(value)))
        .collect();
    item.insert(USERNAME_KEY.to_string(), DynamoUserStore::key_value(user.username()));
    item
}

fn from_item(username: &str, item: &Item) -> StoreResult<User> {
    let mut attributes = Attributes::new();
    for (field, attribute) in item {
        if field == USERNAME_KEY {
            continue;
        }
        let value = from_attribute(attribute).map_err(|reason| StoreError::Corrupt {
            username: username.to_string(),
            reason: format!("attribute {field}: {reason}"),
        })?;
        attributes.insert(field.clone(), value);
    }
    Ok(User::new(username, attributes))
}

fn to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(items) => AttributeValue::L(items.iter().map(to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(
            map.iter()
                .map(|(k, v)| (k.clone(), to_attribute(v)))
                .collect(),
        ),
    }
}

fn from_attribute(attribute: &AttributeValue) -> Result<Value, String> {
    match attribute {
        AttributeValue::S(s) => Ok(Value::String(s.clone())),
        AttributeValue::N(n) => parse_number(n),
        AttributeValue::Bool(b) => Ok(Value::Bool(*b)),
        AttributeValue::Null(_) => Ok(Value::Null),
        AttributeValue::L(items) => items
            .iter()
            .map(from_attribute)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        AttributeValue::M(map) => map
            .iter()
            .map(|(k, v)| from_attribute(v).map(|v| (k.clone(), v)))
            .collect::<Result<Map<_, _>, _>>()
            .map(Value::Object),
        // Sets written by other tools read back as arrays.
        AttributeValue::Ss(set) => Ok(Value::Array(
            set.iter().cloned().map(Value::String).collect(),
        )),
        AttributeValue::Ns(set) => set
            .iter()
            .map(|n| parse_number(n))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => Err(format!("unsupported attribute type: {other:?}")),
    }
}

fn parse_number(n: &str) -> Result<Value, String> {
    if let Ok(i) = n.parse::<i64>() {
        return Ok(Value::from(i));
    }
    if let Ok(u) = n.parse::<u64>() {
        return Ok(Value::from(u));
    }
    n.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| format!("invalid number: {n}"))
}
