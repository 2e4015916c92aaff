/// Track domain type
use crate::types::{AccentColor, ObjectUrl, StorageKey, TrackId};

/// Where a track's audio comes from
///
/// Exactly one descriptor per track. `None` tracks are metadata-only
/// placeholders and can never play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackSource {
    /// Stable, re-fetchable remote URL
    Remote {
        /// `http(s)` URL of the audio file
        url: String,
    },

    /// Blob persisted in the asset store; needs rehydration into a live handle
    Stored {
        /// Key of the blob in the asset store
        key: StorageKey,
    },

    /// No playable source
    None,
}

/// Playlist entry
///
/// The live handle is session state only: it is attached after rehydration
/// (or on local-file addition) and never leaves memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// Unique track identifier
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Artist name
    pub artist: String,

    /// Accent color used for theming
    pub color: AccentColor,

    /// Durable source descriptor
    pub source: TrackSource,

    /// Live handle feeding the media element (stored tracks only)
    pub live_handle: Option<ObjectUrl>,

    /// Set when rehydration found no blob for this track's storage key
    pub asset_missing: bool,
}

impl Track {
    /// Create a track without a live handle
    pub fn new(
        id: TrackId,
        title: impl Into<String>,
        artist: impl Into<String>,
        color: AccentColor,
        source: TrackSource,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            artist: artist.into(),
            color,
            source,
            live_handle: None,
            asset_missing: false,
        }
    }

    /// Storage key, for stored tracks
    pub fn storage_key(&self) -> Option<&StorageKey> {
        match &self.source {
            TrackSource::Stored { key } => Some(key),
            TrackSource::Remote { .. } | TrackSource::None => None,
        }
    }

    /// Remote URL, for remote tracks
    pub fn remote_url(&self) -> Option<&str> {
        match &self.source {
            TrackSource::Remote { url } => Some(url),
            TrackSource::Stored { .. } | TrackSource::None => None,
        }
    }

    /// Source string the media element should load, if any
    pub fn resolved_source(&self) -> Option<&str> {
        match &self.source {
            TrackSource::Remote { url } => Some(url),
            TrackSource::Stored { .. } => self.live_handle.as_ref().map(ObjectUrl::as_str),
            TrackSource::None => None,
        }
    }

    /// Whether the media element can be pointed at this track right now
    pub fn is_playable(&self) -> bool {
        self.resolved_source().is_some()
    }

    /// Whether this stored track is still waiting for rehydration
    pub fn needs_rehydration(&self) -> bool {
        self.storage_key().is_some() && self.live_handle.is_none() && !self.asset_missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn color() -> AccentColor {
        AccentColor::from_rgb(0x63, 0x66, 0xf1)
    }

    #[test]
    fn remote_track_is_playable() {
        let track = Track::new(
            TrackId::new("1"),
            "Song",
            "Artist",
            color(),
            TrackSource::Remote {
                url: "https://example.com/a.mp3".to_string(),
            },
        );
        assert!(track.is_playable());
        assert_eq!(track.resolved_source(), Some("https://example.com/a.mp3"));
        assert!(!track.needs_rehydration());
    }

    #[test]
    fn stored_track_plays_only_with_live_handle() {
        let id = TrackId::new("2");
        let mut track = Track::new(
            id.clone(),
            "Local",
            "Local",
            color(),
            TrackSource::Stored {
                key: StorageKey::for_track(&id),
            },
        );
        assert!(!track.is_playable());
        assert!(track.needs_rehydration());

        let handle = ObjectUrl::generate();
        track.live_handle = Some(handle.clone());
        assert!(track.is_playable());
        assert_eq!(track.resolved_source(), Some(handle.as_str()));
        assert!(!track.needs_rehydration());
    }

    #[test]
    fn missing_asset_is_terminal() {
        let id = TrackId::new("3");
        let mut track = Track::new(
            id.clone(),
            "Gone",
            "Local",
            color(),
            TrackSource::Stored {
                key: StorageKey::for_track(&id),
            },
        );
        track.asset_missing = true;
        assert!(!track.is_playable());
        assert!(!track.needs_rehydration());
    }

    #[test]
    fn metadata_only_track_never_plays() {
        let track = Track::new(TrackId::new("4"), "Ghost", "?", color(), TrackSource::None);
        assert!(!track.is_playable());
        assert!(track.storage_key().is_none());
        assert!(track.remote_url().is_none());
    }
}
