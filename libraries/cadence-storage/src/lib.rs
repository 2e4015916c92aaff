//! Cadence Storage
//!
//! Durable persistence backends for the Cadence playback core.
//!
//! Two independent stores, mirroring the browser APIs the player was designed
//! around:
//! - **Asset stores** (`AssetStore`): key → audio blob, the IndexedDB role
//! - **Snapshot stores** (`SnapshotStore`): name → JSON document, the
//!   localStorage role
//!
//! Each comes in an in-memory flavor (tests, ephemeral sessions) and a
//! filesystem flavor (one file per key under a directory).
//!
//! # Example
//!
//! ```rust,no_run
//! use cadence_core::{AssetStore, Blob, StorageKey};
//! use cadence_storage::FsAssetStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = FsAssetStore::open("./data/assets").await?;
//! let key = StorageKey::new("file-1700000000000-1a2b3c4d");
//!
//! store.put(&key, Blob::with_content_type(vec![0u8; 16], "audio/mpeg")).await?;
//! assert!(store.get(&key).await?.is_some());
//!
//! store.delete(&key).await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod lock;

// Vertical slices
pub mod assets;
pub mod snapshots;

pub use assets::{FsAssetStore, MemoryAssetStore};
pub use error::StorageError;
pub use snapshots::{FsSnapshotStore, MemorySnapshotStore};
