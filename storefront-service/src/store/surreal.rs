//! SurrealDB document store
//!
//! Supports runtime protocol selection via URL scheme:
//! - `ws://` / `wss://` - WebSocket connections
//! - `http://` / `https://` - HTTP connections
//! - `mem://` - In-memory database (for testing)
//!
//! Each collection maps to a table and each document to the record
//! `type::thing(collection, id)`.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use super::{
    with_id, without_id, Document, DocumentStore, FilterCondition, FilterOperator, StoreError,
    StoreResult, ID_FIELD,
};
use crate::config::StoreConfig;

/// Longest pause between connection attempts
const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

/// SurrealDB client type alias using the `Any` engine for runtime protocol selection
pub type SurrealClient = surrealdb::Surreal<surrealdb::engine::any::Any>;

/// Document store backed by SurrealDB
#[derive(Clone)]
pub struct SurrealDocumentStore {
    client: SurrealClient,
}

impl SurrealDocumentStore {
    /// Connect with exponential backoff between attempts
    pub async fn connect(config: &StoreConfig, namespace: &str, database: &str) -> StoreResult<Self> {
        let mut attempt = 0;
        let base_delay = Duration::from_secs(config.retry_delay_secs);

        loop {
            match Self::try_connect(config, namespace, database).await {
                Ok(store) => {
                    tracing::info!(
                        "SurrealDB connected: url={}, ns={}, db={}",
                        sanitize_connection_url(&config.url),
                        namespace,
                        database
                    );
                    return Ok(store);
                }
                Err(e) => {
                    attempt += 1;
                    if attempt > config.max_retries {
                        tracing::error!(
                            "Failed to connect to SurrealDB after {} attempts: {}",
                            config.max_retries + 1,
                            e
                        );
                        return Err(e);
                    }

                    let delay = retry_delay(base_delay, attempt);
                    tracing::warn!(
                        "SurrealDB connection attempt {} failed: {}. Retrying in {:?}...",
                        attempt,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn try_connect(config: &StoreConfig, namespace: &str, database: &str) -> StoreResult<Self> {
        let url_safe = sanitize_connection_url(&config.url);
        tracing::debug!("Connecting to SurrealDB: {}", url_safe);

        let client = surrealdb::engine::any::connect(&config.url)
            .await
            .map_err(|e| backend(format!("failed to connect to '{}'", url_safe), e))?;

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            client
                .signin(surrealdb::opt::auth::Root { username, password })
                .await
                .map_err(|e| backend(format!("failed to authenticate with '{}'", url_safe), e))?;
        }

        client
            .use_ns(namespace)
            .use_db(database)
            .await
            .map_err(|e| {
                backend(
                    format!("failed to select namespace '{namespace}' / database '{database}'"),
                    e,
                )
            })?;

        Ok(Self { client })
    }

    async fn rows(&self, query: String, binds: Vec<(String, Value)>) -> StoreResult<Vec<Value>> {
        let mut request = self.client.query(query);
        for bind in binds {
            request = request.bind(bind);
        }
        let mut response = request.await.map_err(|e| backend("query failed", e))?;
        response
            .take::<Vec<Value>>(0)
            .map_err(|e| backend("failed to decode query result", e))
    }
}

#[async_trait]
impl DocumentStore for SurrealDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let rows = self
            .rows(
                "SELECT * FROM type::thing($tb, $id)".to_string(),
                record_binds(collection, id),
            )
            .await?;

        Ok(rows
            .into_iter()
            .next()
            .and_then(into_document)
            .map(|document| with_id(document, id)))
    }

    async fn set(&self, collection: &str, id: &str, document: Document) -> StoreResult<()> {
        let mut binds = record_binds(collection, id);
        binds.push(("data".to_string(), Value::Object(without_id(document))));
        self.rows(
            "UPSERT type::thing($tb, $id) CONTENT $data RETURN NONE".to_string(),
            binds,
        )
        .await?;
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, fields: Document) -> StoreResult<()> {
        let mut binds = record_binds(collection, id);
        binds.push(("data".to_string(), Value::Object(without_id(fields))));
        let updated = self
            .rows(
                "UPDATE type::thing($tb, $id) MERGE $data RETURN AFTER".to_string(),
                binds,
            )
            .await?;

        if updated.is_empty() {
            return Err(StoreError::not_found(collection, id));
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool> {
        let removed = self
            .rows(
                "DELETE type::thing($tb, $id) RETURN BEFORE".to_string(),
                record_binds(collection, id),
            )
            .await?;
        Ok(!removed.is_empty())
    }

    async fn query(
        &self,
        collection: &str,
        filters: &[FilterCondition],
    ) -> StoreResult<Vec<Document>> {
        let mut binds = vec![("tb".to_string(), Value::String(collection.to_string()))];
        let mut clauses = Vec::with_capacity(filters.len());

        for (index, filter) in filters.iter().enumerate() {
            if !is_field_name(&filter.field) {
                return Err(StoreError::Backend(format!(
                    "invalid filter field '{}'",
                    filter.field
                )));
            }
            let param = format!("f{index}");
            clauses.push(match filter.operator {
                FilterOperator::Equal => format!("{} = ${param}", filter.field),
                FilterOperator::StartsWith => {
                    format!("string::starts_with({}, ${param})", filter.field)
                }
            });
            binds.push((param, Value::from(&filter.value)));
        }

        let mut query = "SELECT * FROM type::table($tb)".to_string();
        if !clauses.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&clauses.join(" AND "));
        }
        query.push_str(" ORDER BY id");

        let rows = self.rows(query, binds).await?;
        rows.into_iter()
            .map(|row| row_document(collection, row))
            .collect()
    }

    async fn ping(&self) -> StoreResult<()> {
        self.client
            .health()
            .await
            .map_err(|e| backend("health check failed", e))
    }
}

fn record_binds(collection: &str, id: &str) -> Vec<(String, Value)> {
    vec![
        ("tb".to_string(), Value::String(collection.to_string())),
        ("id".to_string(), Value::String(id.to_string())),
    ]
}

fn backend(context: impl std::fmt::Display, err: surrealdb::Error) -> StoreError {
    StoreError::Backend(format!("{context}: {err}"))
}

fn into_document(value: Value) -> Option<Document> {
    match value {
        Value::Object(document) => Some(document),
        _ => None,
    }
}

/// Decode a query row, failing rather than dropping rows the store cannot read
fn row_document(collection: &str, row: Value) -> StoreResult<Document> {
    let Some(id) = row.get(ID_FIELD).and_then(record_key) else {
        tracing::warn!(collection = %collection, "Query row has an unreadable record id");
        return Err(StoreError::Backend(format!(
            "unreadable record id in '{}': {}",
            collection,
            row.get(ID_FIELD).unwrap_or(&Value::Null)
        )));
    };
    into_document(row)
        .map(|document| with_id(document, &id))
        .ok_or_else(|| StoreError::Backend(format!("record '{collection}:{id}' is not an object")))
}

/// Exponential backoff, doubling from `base` and capped at [`MAX_RETRY_DELAY`]
fn retry_delay(base: Duration, attempt: u32) -> Duration {
    2_u32
        .checked_pow(attempt.saturating_sub(1))
        .and_then(|factor| base.checked_mul(factor))
        .map_or(MAX_RETRY_DELAY, |delay| delay.min(MAX_RETRY_DELAY))
}

fn is_field_name(field: &str) -> bool {
    !field.is_empty() && field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Key part of a record id, which decodes either as `"table:key"` or as
/// `{ "tb": "table", "id": { "String": "key" } }`
fn record_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let key = s.split_once(':').map_or(s.as_str(), |(_, key)| key);
            Some(key.trim_matches(|c| c == '⟨' || c == '⟩' || c == '`').to_string())
        }
        Value::Object(obj) => obj.get("id").and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Object(inner) => inner.get("String").and_then(|s| s.as_str().map(String::from)),
            _ => None,
        }),
        _ => None,
    }
}

/// Sanitize connection URL for safe logging (remove credentials if present)
fn sanitize_connection_url(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(scheme_end) = url.find("://") {
            let scheme = &url[..=scheme_end + 2];
            let after_at = &url[at_pos..];
            return format!("{}***{}", scheme, after_at);
        }
    }
    url.to_string()
}
