//! Error types for playback management
//!
//! None of these are fatal. Each is handled where it occurs and surfaced to
//! observers as a `PlayerEvent::Warning`.

use cadence_core::{StorageKey, TrackId};
use thiserror::Error;

/// Playback errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaybackError {
    /// Asset or snapshot store could not be used; the session continues
    /// without durability
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A stored track's blob is gone from the asset store
    #[error("Asset missing for track {id} (key {key})")]
    AssetMissing {
        /// Track that lost its audio
        id: TrackId,
        /// Key that resolved to nothing
        key: StorageKey,
    },

    /// The media element refused to start playback
    #[error("Playback rejected: {0}")]
    PlaybackRejected(String),

    /// The durable snapshot could not be parsed and was replaced by defaults
    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<cadence_core::CoreError> for PlaybackError {
    fn from(err: cadence_core::CoreError) -> Self {
        Self::StorageUnavailable(err.to_string())
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
