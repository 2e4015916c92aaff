//! Asset stores: durable key → audio blob persistence

use crate::error::{validate_key, Result, StorageError};
use crate::lock::KeyLocks;
use async_trait::async_trait;
use bytes::Bytes;
use cadence_core::{AssetStore, Blob, StorageKey};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// In-memory asset store
///
/// Data lives as long as the store does. Useful for tests and for sessions
/// where persistence is not wanted.
#[derive(Debug, Default)]
pub struct MemoryAssetStore {
    blobs: RwLock<HashMap<StorageKey, Blob>>,
}

impl MemoryAssetStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    /// Whether the store is empty
    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl AssetStore for MemoryAssetStore {
    async fn put(&self, key: &StorageKey, blob: Blob) -> cadence_core::Result<()> {
        self.blobs.write().await.insert(key.clone(), blob);
        Ok(())
    }

    async fn get(&self, key: &StorageKey) -> cadence_core::Result<Option<Blob>> {
        Ok(self.blobs.read().await.get(key).cloned())
    }

    async fn delete(&self, key: &StorageKey) -> cadence_core::Result<()> {
        self.blobs.write().await.remove(key);
        Ok(())
    }

    async fn contains(&self, key: &StorageKey) -> cadence_core::Result<bool> {
        Ok(self.blobs.read().await.contains_key(key))
    }
}

/// Sidecar metadata written next to each blob
#[derive(Debug, Serialize, Deserialize)]
struct AssetMeta {
    content_type: Option<String>,
    size: u64,
}

/// Filesystem asset store
///
/// Layout, one pair of files per key:
///
/// ```text
/// <root>/<key>.bin   raw bytes
/// <root>/<key>.json  content type and size
/// ```
///
/// Writes land in a temporary file first and are renamed into place, so a
/// reader never observes a half-written blob. Writes and deletes of the same
/// key are serialized.
#[derive(Debug)]
pub struct FsAssetStore {
    root: PathBuf,
    locks: KeyLocks,
}

impl FsAssetStore {
    /// Open (creating if necessary) a store rooted at `root`
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub async fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        debug!(root = %root.display(), "Opened asset store");

        Ok(Self {
            root,
            locks: KeyLocks::new(),
        })
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.bin"))
    }

    fn meta_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    async fn put_inner(&self, key: &StorageKey, blob: Blob) -> Result<()> {
        let key = key.as_str();
        validate_key(key)?;
        let _guard = self.locks.acquire(key).await;

        let meta = AssetMeta {
            content_type: blob.content_type().map(str::to_string),
            size: blob.len() as u64,
        };

        write_atomic(&self.blob_path(key), blob.data()).await?;
        write_atomic(&self.meta_path(key), &serde_json::to_vec(&meta)?).await?;

        debug!(key, size = meta.size, "Stored asset");
        Ok(())
    }

    async fn get_inner(&self, key: &StorageKey) -> Result<Option<Blob>> {
        let key = key.as_str();
        validate_key(key)?;

        let data = match fs::read(self.blob_path(key)).await {
            Ok(data) => Bytes::from(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        // A missing or unreadable sidecar only loses the content type
        let content_type = match fs::read(self.meta_path(key)).await {
            Ok(raw) => match serde_json::from_slice::<AssetMeta>(&raw) {
                Ok(meta) => meta.content_type,
                Err(e) => {
                    warn!(key, error = %e, "Ignoring corrupt asset metadata");
                    None
                }
            },
            Err(_) => None,
        };

        Ok(Some(match content_type {
            Some(content_type) => Blob::with_content_type(data, content_type),
            None => Blob::new(data),
        }))
    }

    async fn delete_inner(&self, key: &StorageKey) -> Result<()> {
        let key = key.as_str();
        validate_key(key)?;
        let _guard = self.locks.acquire(key).await;

        remove_if_exists(&self.blob_path(key)).await?;
        remove_if_exists(&self.meta_path(key)).await?;

        debug!(key, "Deleted asset");
        Ok(())
    }
}

#[async_trait]
impl AssetStore for FsAssetStore {
    async fn put(&self, key: &StorageKey, blob: Blob) -> cadence_core::Result<()> {
        Ok(self.put_inner(key, blob).await?)
    }

    async fn get(&self, key: &StorageKey) -> cadence_core::Result<Option<Blob>> {
        Ok(self.get_inner(key).await?)
    }

    async fn delete(&self, key: &StorageKey) -> cadence_core::Result<()> {
        Ok(self.delete_inner(key).await?)
    }

    async fn contains(&self, key: &StorageKey) -> cadence_core::Result<bool> {
        validate_key(key.as_str())?;
        Ok(fs::try_exists(self.blob_path(key.as_str()))
            .await
            .map_err(StorageError::from)?)
    }
}

/// Write `data` to `path` through a sibling temp file and a rename
pub(crate) async fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(format!(".tmp-{}", std::process::id()));
    let tmp = PathBuf::from(tmp);

    let mut file = fs::File::create(&tmp).await?;
    file.write_all(data).await?;
    file.sync_all().await?;
    drop(file);

    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}

async fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
