//! Storage traits
//!
//! Both stores are async because every browser persistence API is, and the
//! playback core must tolerate state changing while an operation is in
//! flight.

use crate::error::Result;
use crate::types::{Blob, StorageKey};
use async_trait::async_trait;

/// Durable key → binary blob persistence (IndexedDB in the browser)
///
/// Operations may be issued concurrently. Implementations must serialize
/// conflicting writes to the same key.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Store `blob` under `key`, replacing any previous value
    ///
    /// # Errors
    /// Returns `CoreError::StorageUnavailable` when the backend cannot be written.
    async fn put(&self, key: &StorageKey, blob: Blob) -> Result<()>;

    /// Fetch the blob stored under `key`, `Ok(None)` when absent
    async fn get(&self, key: &StorageKey) -> Result<Option<Blob>>;

    /// Delete the blob stored under `key`
    ///
    /// Idempotent: deleting an absent key succeeds.
    async fn delete(&self, key: &StorageKey) -> Result<()>;

    /// Check whether a blob exists under `key`
    async fn contains(&self, key: &StorageKey) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }
}

/// Durable single-document persistence (localStorage in the browser)
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Read the document stored under `name`, `Ok(None)` when never written
    async fn read(&self, name: &str) -> Result<Option<String>>;

    /// Replace the document stored under `name`
    async fn write(&self, name: &str, contents: &str) -> Result<()>;
}
