//! Snapshot stores: durable name → JSON document persistence

use crate::assets::write_atomic;
use crate::error::{validate_key, Result};
use crate::lock::KeyLocks;
use async_trait::async_trait;
use cadence_core::SnapshotStore;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory snapshot store
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    documents: RwLock<HashMap<String, String>>,
}

impl MemorySnapshotStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one document
    pub fn with_document(name: impl Into<String>, contents: impl Into<String>) -> Self {
        let mut documents = HashMap::new();
        documents.insert(name.into(), contents.into());
        Self {
            documents: RwLock::new(documents),
        }
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn read(&self, name: &str) -> cadence_core::Result<Option<String>> {
        Ok(self.documents.read().await.get(name).cloned())
    }

    async fn write(&self, name: &str, contents: &str) -> cadence_core::Result<()> {
        self.documents
            .write()
            .await
            .insert(name.to_string(), contents.to_string());
        Ok(())
    }
}

/// Filesystem snapshot store, one `<name>.json` file per document
#[derive(Debug)]
pub struct FsSnapshotStore {
    root: PathBuf,
    locks: KeyLocks,
}

impl FsSnapshotStore {
    /// Open (creating if necessary) a store rooted at `root`
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub async fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        debug!(root = %root.display(), "Opened snapshot store");

        Ok(Self {
            root,
            locks: KeyLocks::new(),
        })
    }

    fn document_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.json"))
    }

    async fn read_inner(&self, name: &str) -> Result<Option<String>> {
        validate_key(name)?;
        match fs::read_to_string(self.document_path(name)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_inner(&self, name: &str, contents: &str) -> Result<()> {
        validate_key(name)?;
        let _guard = self.locks.acquire(name).await;
        write_atomic(&self.document_path(name), contents.as_bytes()).await?;
        debug!(name, bytes = contents.len(), "Wrote snapshot");
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for FsSnapshotStore {
    async fn read(&self, name: &str) -> cadence_core::Result<Option<String>> {
        Ok(self.read_inner(name).await?)
    }

    async fn write(&self, name: &str, contents: &str) -> cadence_core::Result<()> {
        Ok(self.write_inner(name, contents).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_overwrites_document() {
        let store = MemorySnapshotStore::with_document("music_playlist", "[]");
        assert_eq!(
            store.read("music_playlist").await.unwrap().as_deref(),
            Some("[]")
        );

        store.write("music_playlist", "[1]").await.unwrap();
        assert_eq!(
            store.read("music_playlist").await.unwrap().as_deref(),
            Some("[1]")
        );
        assert!(store.read("other").await.unwrap().is_none());
    }
}
