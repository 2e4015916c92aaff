//! Durable playlist snapshot
//!
//! The snapshot is a JSON array of entries:
//!
//! ```json
//! [
//!   { "id": "1", "title": "Song", "artist": "Band", "color": "#10b981",
//!     "url": "https://example.com/song.mp3" },
//!   { "id": "1700000000000-42", "title": "demo", "artist": "Local",
//!     "color": "#f97316", "storageKey": "file-1700000000000-42" }
//! ]
//! ```
//!
//! Live handles and audio bytes never appear in it. Reading is lenient:
//! entries are normalized one by one and unknown fields are ignored.

use crate::error::{PlaybackError, Result};
use cadence_core::{AccentColor, StorageKey, Track, TrackId, TrackSource};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;
use url::Url;

/// One durable playlist entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotEntry {
    /// Track id
    pub id: String,

    /// Track title
    pub title: String,

    /// Artist name
    pub artist: String,

    /// `#RRGGBB` accent color
    pub color: String,

    /// Asset store key, for local files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_key: Option<String>,

    /// Remote `http(s)` URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// What the reader accepts before normalization
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    artist: Option<String>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    storage_key: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// Whether `candidate` is a well-formed `http` or `https` URL
pub fn is_web_url(candidate: &str) -> bool {
    Url::parse(candidate).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

/// The built-in playlist used when no usable snapshot exists
pub fn default_tracks() -> Vec<Track> {
    let song = |n: u32, color: AccentColor| {
        Track::new(
            TrackId::new(n.to_string()),
            format!("SoundHelix Song {n}"),
            "SoundHelix",
            color,
            TrackSource::Remote {
                url: format!("https://www.soundhelix.com/examples/mp3/SoundHelix-Song-{n}.mp3"),
            },
        )
    };

    vec![
        song(1, AccentColor::from_rgb(0x10, 0xb9, 0x81)),
        song(2, AccentColor::from_rgb(0xf9, 0x73, 0x16)),
    ]
}

/// Parse and normalize a snapshot document
///
/// Normalization per entry:
/// - missing or malformed color becomes `default_color`
/// - `storageKey` wins over `url` when both are present
/// - a `url` that is not `http(s)` is dropped, leaving a metadata-only track
/// - entries repeating an earlier id are dropped
/// - entries that are not objects with a string `id` are skipped
///
/// # Errors
/// `MalformedSnapshot` when the document is not a JSON array.
pub fn parse(document: &str, default_color: AccentColor) -> Result<Vec<Track>> {
    let values: Vec<serde_json::Value> = serde_json::from_str(document)
        .map_err(|e| PlaybackError::MalformedSnapshot(e.to_string()))?;

    let mut seen = HashSet::new();
    let mut tracks = Vec::with_capacity(values.len());

    for (position, value) in values.into_iter().enumerate() {
        let raw = match serde_json::from_value::<RawEntry>(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(position, error = %e, "Skipping unreadable snapshot entry");
                continue;
            }
        };

        if !seen.insert(raw.id.clone()) {
            warn!(id = %raw.id, "Skipping duplicate snapshot entry");
            continue;
        }

        tracks.push(normalize(raw, default_color));
    }

    Ok(tracks)
}

fn normalize(raw: RawEntry, default_color: AccentColor) -> Track {
    let color = raw
        .color
        .as_deref()
        .and_then(AccentColor::parse)
        .unwrap_or(default_color);

    let storage_key = raw.storage_key.filter(|key| !key.is_empty());
    let url = raw.url.filter(|url| !url.is_empty());

    let source = match (storage_key, url) {
        (Some(key), _) => TrackSource::Stored {
            key: StorageKey::new(key),
        },
        (None, Some(url)) if is_web_url(&url) => TrackSource::Remote { url },
        (None, Some(url)) => {
            warn!(id = %raw.id, url = %url, "Dropping non-http source from snapshot");
            TrackSource::None
        }
        (None, None) => TrackSource::None,
    };

    Track::new(
        TrackId::new(raw.id),
        raw.title.unwrap_or_default(),
        raw.artist.unwrap_or_default(),
        color,
        source,
    )
}

/// Durable form of one track
pub fn safe_entry(track: &Track) -> SnapshotEntry {
    let (storage_key, url) = match &track.source {
        TrackSource::Stored { key } => (Some(key.as_str().to_string()), None),
        TrackSource::Remote { url } if is_web_url(url) => (None, Some(url.clone())),
        TrackSource::Remote { .. } | TrackSource::None => (None, None),
    };

    SnapshotEntry {
        id: track.id.as_str().to_string(),
        title: track.title.clone(),
        artist: track.artist.clone(),
        color: track.color.to_string(),
        storage_key,
        url,
    }
}

/// Durable form of a whole playlist
pub fn safe_snapshot(tracks: &[Track]) -> Vec<SnapshotEntry> {
    tracks.iter().map(safe_entry).collect()
}

/// Serialize the durable form of a playlist
pub fn encode(tracks: &[Track]) -> Result<String> {
    serde_json::to_string(&safe_snapshot(tracks))
        .map_err(|e| PlaybackError::MalformedSnapshot(e.to_string()))
}
