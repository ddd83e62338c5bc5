//! Index persistence abstraction.
//!
//! The [`IndexStore`] trait is the pipeline's only view of storage: get an
//! index by document id, or put a whole index. The core never assumes a
//! particular medium; re-ingestion of the same document id is a
//! last-writer-wins replacement of the whole record, never a partial
//! update.
//!
//! Two backends are provided: [`InMemoryStore`] for tests and embedding in
//! other programs, and [`JsonFileStore`], which keeps one JSON record per
//! document under a directory.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;

use crate::models::DocumentIndex;

/// Abstract storage for document indexes.
#[async_trait]
pub trait IndexStore: Send + Sync {
    /// Retrieve the index for a document id, if one exists.
    async fn get(&self, document_id: &str) -> Result<Option<DocumentIndex>>;

    /// Persist an index, replacing any existing record for its document id.
    async fn put(&self, index: &DocumentIndex) -> Result<()>;
}

/// In-memory store for tests and embedded use.
pub struct InMemoryStore {
    indexes: RwLock<HashMap<String, DocumentIndex>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            indexes: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IndexStore for InMemoryStore {
    async fn get(&self, document_id: &str) -> Result<Option<DocumentIndex>> {
        let indexes = self.indexes.read().unwrap();
        Ok(indexes.get(document_id).cloned())
    }

    async fn put(&self, index: &DocumentIndex) -> Result<()> {
        let mut indexes = self.indexes.write().unwrap();
        indexes.insert(index.document_id.clone(), index.clone());
        Ok(())
    }
}

/// File-backed store: one `{document_id}.json` per index.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create store directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn path_for(&self, document_id: &str) -> Result<PathBuf> {
        // Ids become filenames; reject anything that could escape the dir.
        if document_id.is_empty()
            || !document_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            bail!("invalid document id: {:?}", document_id);
        }
        Ok(self.dir.join(format!("{}.json", document_id)))
    }
}

#[async_trait]
impl IndexStore for JsonFileStore {
    async fn get(&self, document_id: &str) -> Result<Option<DocumentIndex>> {
        let path = self.path_for(document_id)?;
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read index {}", path.display()))
            }
        };
        let index = serde_json::from_slice(&bytes)
            .with_context(|| format!("failed to parse index {}", path.display()))?;
        Ok(Some(index))
    }

    async fn put(&self, index: &DocumentIndex) -> Result<()> {
        let path = self.path_for(&index.document_id)?;
        let json = serde_json::to_vec_pretty(index)?;
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write index {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_index(document_id: &str) -> DocumentIndex {
        DocumentIndex {
            document_id: document_id.to_string(),
            filename: "report.pdf".to_string(),
            created_at: Utc::now(),
            pages: Vec::new(),
            units: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = InMemoryStore::new();
        assert!(store.get("doc1").await.unwrap().is_none());

        store.put(&sample_index("doc1")).await.unwrap();
        let loaded = store.get("doc1").await.unwrap().unwrap();
        assert_eq!(loaded.filename, "report.pdf");
    }

    #[tokio::test]
    async fn test_memory_store_put_replaces() {
        let store = InMemoryStore::new();
        store.put(&sample_index("doc1")).await.unwrap();

        let mut updated = sample_index("doc1");
        updated.filename = "updated.pdf".to_string();
        store.put(&updated).await.unwrap();

        let loaded = store.get("doc1").await.unwrap().unwrap();
        assert_eq!(loaded.filename, "updated.pdf");
    }

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = JsonFileStore::new(tmp.path().join("indexes")).unwrap();

        assert!(store.get("doc-1").await.unwrap().is_none());
        store.put(&sample_index("doc-1")).await.unwrap();

        let loaded = store.get("doc-1").await.unwrap().unwrap();
        assert_eq!(loaded.document_id, "doc-1");
        assert_eq!(loaded.filename, "report.pdf");
    }

    #[tokio::test]
    async fn test_file_store_rejects_unsafe_ids() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = JsonFileStore::new(tmp.path()).unwrap();

        assert!(store.get("../escape").await.is_err());
        assert!(store.get("").await.is_err());
        assert!(store.put(&sample_index("a/b")).await.is_err());
    }
}
