use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::SchwabError;

use super::{Document, DocumentRef, DocumentStore};

/// Documents as pretty-printed JSON files: `{root}/{collection}/{document}.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

/// `~/.schwab-connect/store`
pub fn default_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".schwab-connect")
        .join("store")
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn document_path(&self, doc: &DocumentRef) -> PathBuf {
        self.root
            .join(&doc.collection)
            .join(format!("{}.json", doc.document))
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn read_document(&self, doc: &DocumentRef) -> Result<Option<Document>, SchwabError> {
        let path = self.document_path(doc);
        let data = match tokio::fs::read_to_string(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(doc.store_error(format!("cannot read {}: {e}", path.display()))),
        };
        let body: Document = serde_json::from_str(&data)
            .map_err(|e| doc.store_error(format!("invalid JSON in {}: {e}", path.display())))?;
        Ok(Some(body))
    }

    async fn write_document(&self, doc: &DocumentRef, body: &Document) -> Result<(), SchwabError> {
        let path = self.document_path(doc);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let data = serde_json::to_string_pretty(body)
            .map_err(|e| doc.store_error(format!("failed to serialize document: {e}")))?;

        // Write beside the target and rename so readers never see a partial file.
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, data).await?;
        tokio::fs::rename(&tmp, &path).await?;
        tracing::debug!("Updated {} at {}", doc, path.display());
        Ok(())
    }
}
