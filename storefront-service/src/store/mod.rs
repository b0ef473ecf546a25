//! Document store abstraction
//!
//! Resources persist as JSON documents grouped in named collections. The store is an
//! external collaborator: the rest of the crate only relies on the [`DocumentStore`]
//! trait, which has an in-memory implementation (tests and local development) and a
//! SurrealDB implementation behind the `surrealdb` feature.
//!
//! Documents handed out by a store always carry their identifier in an `"id"` field.
//! Documents handed in may carry one too; it is ignored in favor of the explicit id.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

mod filter;
mod memory;
#[cfg(feature = "surrealdb")]
mod surreal;

pub use filter::{FilterCondition, FilterOperator, FilterValue};
pub use memory::MemoryDocumentStore;
#[cfg(feature = "surrealdb")]
pub use surreal::SurrealDocumentStore;

/// A stored document: a JSON object
pub type Document = Map<String, Value>;

/// Field holding the document identifier in documents returned by a store
pub const ID_FIELD: &str = "id";

/// Errors raised by a document store backend
#[derive(Debug, Error)]
pub enum StoreError {
    /// Targeted document does not exist
    #[error("document {collection}/{id} not found")]
    NotFound { collection: String, id: String },

    /// Backend failed to execute the operation
    #[error("store backend error: {0}")]
    Backend(String),

    /// Document could not be encoded or decoded
    #[error("document codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

impl StoreError {
    pub fn not_found(collection: &str, id: &str) -> Self {
        Self::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for JSON documents keyed by collection and id
///
/// Every operation touches a single document or reads one collection. `update` is
/// atomic per document: either every field lands or none do.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Generate an identifier for a new document
    fn new_id(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }

    /// Fetch one document
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    /// Create or fully overwrite a document
    async fn set(&self, collection: &str, id: &str, document: Document) -> StoreResult<()>;

    /// Merge `fields` into an existing document
    ///
    /// Fails with [`StoreError::NotFound`] if the document does not exist.
    async fn update(&self, collection: &str, id: &str, fields: Document) -> StoreResult<()>;

    /// Remove a document, returning whether it existed
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool>;

    /// All documents of a collection matching every condition, ordered by id
    async fn query(
        &self,
        collection: &str,
        filters: &[FilterCondition],
    ) -> StoreResult<Vec<Document>>;

    /// Check that the backend is reachable
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Copy of `document` with its `"id"` field set to `id`
pub(crate) fn with_id(mut document: Document, id: &str) -> Document {
    document.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    document
}

/// Copy of `document` without an `"id"` field
pub(crate) fn without_id(mut document: Document) -> Document {
    document.remove(ID_FIELD);
    document
}
