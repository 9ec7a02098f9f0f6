//! Persistence for the token document.
//!
//! A store holds flat JSON documents addressed by `(collection, document)`.
//! Reads distinguish "absent" (`Ok(None)`) from store failures (`Err`);
//! [`read_field_or_absent`] collapses both into `None` for callers that
//! prefer the fail-soft behaviour.

pub mod file;
pub mod firestore;
pub mod memory;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::SchwabError;

pub use file::FileStore;
pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

pub type Document = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentRef {
    pub collection: String,
    pub document: String,
}

impl DocumentRef {
    pub fn new(collection: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            document: document.into(),
        }
    }

    pub(crate) fn store_error(&self, detail: impl std::fmt::Display) -> SchwabError {
        SchwabError::StoreError {
            collection: self.collection.clone(),
            document: self.document.clone(),
            detail: detail.to_string(),
        }
    }

    pub(crate) fn missing(&self, key: &str) -> SchwabError {
        SchwabError::NoStoredToken {
            collection: self.collection.clone(),
            document: self.document.clone(),
            key: key.to_string(),
        }
    }
}

impl std::fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.collection, self.document)
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read a whole document. `Ok(None)` when it does not exist.
    async fn read_document(&self, doc: &DocumentRef) -> Result<Option<Document>, SchwabError>;

    /// Replace the whole document body, creating it if absent.
    async fn write_document(&self, doc: &DocumentRef, body: &Document)
        -> Result<(), SchwabError>;

    /// Read one field. `Ok(None)` when the document or the field is missing.
    async fn read_field(&self, doc: &DocumentRef, key: &str) -> Result<Option<Value>, SchwabError> {
        Ok(self
            .read_document(doc)
            .await?
            .and_then(|mut body| body.remove(key)))
    }
}

/// Read a field, logging and swallowing store errors.
///
/// Callers cannot tell "not found" from "store unreachable" through this
/// function; use [`DocumentStore::read_field`] when that matters.
pub async fn read_field_or_absent(
    store: &dyn DocumentStore,
    doc: &DocumentRef,
    key: &str,
) -> Option<Value> {
    match store.read_field(doc, key).await {
        Ok(Some(value)) => {
            tracing::debug!("Retrieved {key} value from {doc}");
            Some(value)
        }
        Ok(None) => {
            tracing::error!("Failed to retrieve {key} value: not present in {doc}");
            None
        }
        Err(e) => {
            tracing::error!("Failed to retrieve {key} value: {e}");
            None
        }
    }
}

/// Read a required string field, failing with `NoStoredToken` when absent.
pub async fn read_required_string(
    store: &dyn DocumentStore,
    doc: &DocumentRef,
    key: &str,
) -> Result<String, SchwabError> {
    match store.read_field(doc, key).await? {
        Some(Value::String(s)) if !s.is_empty() => Ok(s),
        Some(_) | None => {
            tracing::error!("No usable {key} stored in {doc}");
            Err(doc.missing(key))
        }
    }
}
