use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::SchwabError;

use super::{Document, DocumentRef, DocumentStore};

/// In-process document store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<DocumentRef, Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn read_document(&self, doc: &DocumentRef) -> Result<Option<Document>, SchwabError> {
        let documents = self
            .documents
            .lock()
            .map_err(|_| doc.store_error("memory store lock poisoned"))?;
        Ok(documents.get(doc).cloned())
    }

    async fn write_document(&self, doc: &DocumentRef, body: &Document) -> Result<(), SchwabError> {
        let mut documents = self
            .documents
            .lock()
            .map_err(|_| doc.store_error("memory store lock poisoned"))?;
        documents.insert(doc.clone(), body.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> DocumentRef {
        DocumentRef::new("schwab-tokens", "schwab-tokens-auth")
    }

    #[tokio::test]
    async fn missing_document_reads_absent() {
        let store = MemoryStore::new();
        assert!(store.read_field(&doc(), "access_token").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_field_reads_absent() {
        let store = MemoryStore::new();
        let body = json!({"access_token": "a"}).as_object().unwrap().clone();
        store.write_document(&doc(), &body).await.unwrap();
        assert!(store.read_field(&doc(), "refresh_token").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn write_replaces_whole_document() {
        let store = MemoryStore::new();
        let first = json!({"access_token": "a1", "refresh_token": "r1", "scope": "api"})
            .as_object()
            .unwrap()
            .clone();
        let second = json!({"access_token": "a2", "refresh_token": "r2"})
            .as_object()
            .unwrap()
            .clone();
        store.write_document(&doc(), &first).await.unwrap();
        store.write_document(&doc(), &second).await.unwrap();

        assert_eq!(store.read_document(&doc()).await.unwrap(), Some(second));
        assert!(store.read_field(&doc(), "scope").await.unwrap().is_none());
    }
}
