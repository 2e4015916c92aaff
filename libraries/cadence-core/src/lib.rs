//! Cadence Core
//!
//! Platform-agnostic types, storage traits, and error handling shared by the
//! Cadence libraries.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `TrackSource`, `Blob`, and the id newtypes
//! - **Core Traits**: `AssetStore` (durable blobs), `SnapshotStore` (durable documents)
//! - **Error Handling**: Unified `CoreError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use cadence_core::{AccentColor, Track, TrackId, TrackSource};
//!
//! let track = Track::new(
//!     TrackId::new("1"),
//!     "SoundHelix Song 1",
//!     "SoundHelix",
//!     AccentColor::parse("#10b981").unwrap(),
//!     TrackSource::Remote {
//!         url: "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-1.mp3".to_string(),
//!     },
//! );
//!
//! assert!(track.is_playable());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use traits::{AssetStore, SnapshotStore};
pub use types::{AccentColor, Blob, ObjectUrl, StorageKey, Track, TrackId, TrackSource};
