//! Playlist model
//!
//! Owns the ordered track list, the live handles backing local tracks, and
//! the links to both durable stores. Every store failure is absorbed here:
//! it is logged, queued as a warning, and the in-memory playlist carries on.

use crate::{
    error::PlaybackError,
    handles::{HandleRegistry, HandleStats},
    snapshot,
    types::PlaybackConfig,
};
use cadence_core::{
    AccentColor, AssetStore, Blob, CoreError, ObjectUrl, SnapshotStore, StorageKey, Track,
    TrackId, TrackSource,
};
use futures_util::future::{BoxFuture, FutureExt};
use futures_util::stream::FuturesUnordered;
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of fetching one stored track's blob
#[derive(Debug, Clone)]
pub enum RehydrationOutcome {
    /// Blob found
    Found(Blob),
    /// Key has no blob; the track can never play
    Missing,
    /// Store failed; the track stays pending and may be retried
    Failed(PlaybackError),
}

/// One completed rehydration lookup
#[derive(Debug, Clone)]
pub struct Rehydrated {
    /// Track the lookup was issued for
    pub id: TrackId,
    /// Key that was looked up
    pub key: StorageKey,
    /// What the store returned
    pub outcome: RehydrationOutcome,
}

/// In-flight rehydration lookups, yielding in completion order
pub type Rehydration = FuturesUnordered<BoxFuture<'static, Rehydrated>>;

/// A track taken out of the playlist
#[derive(Debug, Clone)]
pub struct RemovedTrack {
    /// Position it occupied
    pub index: usize,
    /// The track, with its live handle already released
    pub track: Track,
}

/// The user's playlist
pub struct PlaylistModel {
    tracks: Vec<Track>,
    handles: HandleRegistry,
    assets: Arc<dyn AssetStore>,
    snapshots: Arc<dyn SnapshotStore>,
    snapshot_name: String,
    local_artist: String,
    local_color: AccentColor,
    warnings: Vec<PlaybackError>,
}

impl PlaylistModel {
    /// Rebuild the playlist from the latest durable snapshot
    ///
    /// Falls back to the built-in playlist when no snapshot exists or it
    /// cannot be read or parsed. Never fails.
    pub async fn load(
        snapshots: Arc<dyn SnapshotStore>,
        assets: Arc<dyn AssetStore>,
        config: &PlaybackConfig,
    ) -> Self {
        let mut warnings = Vec::new();

        let tracks = match snapshots.read(&config.snapshot_name).await {
            Ok(Some(document)) => match snapshot::parse(&document, config.default_color) {
                Ok(tracks) => {
                    info!(count = tracks.len(), "Loaded playlist snapshot");
                    tracks
                }
                Err(e) => {
                    warn!(error = %e, "Snapshot unreadable, using default playlist");
                    warnings.push(e);
                    snapshot::default_tracks()
                }
            },
            Ok(None) => {
                debug!("No snapshot, using default playlist");
                snapshot::default_tracks()
            }
            Err(e) => {
                warn!(error = %e, "Snapshot store unavailable, using default playlist");
                warnings.push(PlaybackError::from(e));
                snapshot::default_tracks()
            }
        };

        Self::from_tracks(tracks, snapshots, assets, config, warnings)
    }

    /// Build a playlist from explicit tracks
    ///
    /// Live handles on the given tracks are dropped; only this model's
    /// registry may issue them.
    pub fn with_tracks(
        tracks: Vec<Track>,
        snapshots: Arc<dyn SnapshotStore>,
        assets: Arc<dyn AssetStore>,
        config: &PlaybackConfig,
    ) -> Self {
        Self::from_tracks(tracks, snapshots, assets, config, Vec::new())
    }

    fn from_tracks(
        mut tracks: Vec<Track>,
        snapshots: Arc<dyn SnapshotStore>,
        assets: Arc<dyn AssetStore>,
        config: &PlaybackConfig,
        warnings: Vec<PlaybackError>,
    ) -> Self {
        for track in &mut tracks {
            track.live_handle = None;
        }

        Self {
            tracks,
            handles: HandleRegistry::new(),
            assets,
            snapshots,
            snapshot_name: config.snapshot_name.clone(),
            local_artist: config.local_artist.clone(),
            local_color: config.local_color,
            warnings,
        }
    }

    // ===== Read access =====

    /// Tracks in navigation order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the playlist is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Track at `index`
    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Index of the track with `id`
    pub fn position_of(&self, id: &TrackId) -> Option<usize> {
        self.tracks.iter().position(|track| &track.id == id)
    }

    /// Live handle registry
    pub fn handles(&self) -> &HandleRegistry {
        &self.handles
    }

    /// Live handle counters
    pub fn handle_stats(&self) -> HandleStats {
        self.handles.stats()
    }

    /// Drain warnings queued by store failures
    pub fn take_warnings(&mut self) -> Vec<PlaybackError> {
        std::mem::take(&mut self.warnings)
    }

    // ===== Persistence =====

    /// Write the safe snapshot of the current playlist
    ///
    /// Failure is logged and queued as a warning; the playlist itself is
    /// unaffected.
    pub async fn persist(&mut self) {
        let document = match snapshot::encode(&self.tracks) {
            Ok(document) => document,
            Err(e) => {
                warn!(error = %e, "Could not encode playlist snapshot");
                self.warnings.push(e);
                return;
            }
        };

        match self.snapshots.write(&self.snapshot_name, &document).await {
            Ok(()) => debug!(count = self.tracks.len(), "Persisted playlist snapshot"),
            Err(e) => {
                warn!(error = %e, "Could not persist playlist snapshot");
                self.warnings.push(PlaybackError::from(e));
            }
        }
    }

    /// The safe snapshot, without writing it
    pub fn safe_snapshot(&self) -> Vec<snapshot::SnapshotEntry> {
        snapshot::safe_snapshot(&self.tracks)
    }

    // ===== Mutation =====

    /// Append a local file
    ///
    /// The blob goes to the asset store (best-effort: on failure the track
    /// still plays this session) and a live handle is created right away.
    pub async fn add_local(&mut self, blob: Blob, file_name: &str) -> TrackId {
        let id = self.fresh_id();
        let key = StorageKey::for_track(&id);

        if let Err(e) = self.assets.put(&key, blob.clone()).await {
            warn!(key = %key, error = %e, "Asset store write failed, file won't persist");
            self.warnings.push(PlaybackError::from(e));
        }

        let mut track = Track::new(
            id.clone(),
            title_from_file_name(file_name),
            self.local_artist.clone(),
            self.local_color,
            TrackSource::Stored { key },
        );
        track.live_handle = Some(self.handles.create(blob));

        info!(id = %id, title = %track.title, "Added local track");
        self.tracks.push(track);
        id
    }

    /// Remove a track by id
    ///
    /// Releases its live handle and deletes its stored blob. Deletion
    /// failures are logged and ignored.
    pub async fn remove(&mut self, id: &TrackId) -> Option<RemovedTrack> {
        let index = self.position_of(id)?;
        let mut track = self.tracks.remove(index);

        if let Some(handle) = track.live_handle.take() {
            self.handles.release(&handle);
        }

        if let Some(key) = track.storage_key() {
            if let Err(e) = self.assets.delete(key).await {
                warn!(key = %key, error = %e, "Could not delete stored asset");
                self.warnings.push(PlaybackError::from(e));
            }
        }

        info!(id = %id, index, "Removed track");
        Some(RemovedTrack { index, track })
    }

    /// Release every live handle (session teardown)
    pub fn release_all_handles(&mut self) -> usize {
        for track in &mut self.tracks {
            track.live_handle = None;
        }
        self.handles.release_all()
    }

    // ===== Rehydration =====

    /// Start fetching blobs for every stored track without a live handle
    ///
    /// The lookups run as the returned stream is polled and complete in any
    /// order. Feed each result to `apply_rehydration`. Calling again
    /// restarts lookups for whatever is still pending.
    pub fn rehydrate(&self) -> Rehydration {
        self.tracks
            .iter()
            .filter(|track| track.needs_rehydration())
            .filter_map(|track| {
                let key = track.storage_key()?.clone();
                let id = track.id.clone();
                let assets = Arc::clone(&self.assets);

                Some(
                    async move {
                        let outcome = match assets.get(&key).await {
                            Ok(Some(blob)) => RehydrationOutcome::Found(blob),
                            Ok(None) => RehydrationOutcome::Missing,
                            // A key the store refuses can never hold a blob
                            Err(CoreError::InvalidKey(reason)) => {
                                debug!(key = %key, reason = %reason, "Asset store rejected key");
                                RehydrationOutcome::Missing
                            }
                            Err(e) => RehydrationOutcome::Failed(PlaybackError::from(e)),
                        };
                        Rehydrated { id, key, outcome }
                    }
                    .boxed(),
                )
            })
            .collect()
    }

    /// Apply one rehydration result
    ///
    /// Matched by track id, so results for tracks removed in the meantime
    /// are dropped and results arriving in any order land on the right
    /// track. Returns the new live handle when one was created.
    pub fn apply_rehydration(&mut self, result: Rehydrated) -> Option<(TrackId, ObjectUrl)> {
        let Rehydrated { id, key, outcome } = result;

        let Some(track) = self.tracks.iter_mut().find(|track| track.id == id) else {
            debug!(id = %id, "Dropping rehydration for removed track");
            return None;
        };

        if track.storage_key() != Some(&key) || !track.needs_rehydration() {
            debug!(id = %id, "Dropping stale rehydration");
            return None;
        }

        match outcome {
            RehydrationOutcome::Found(blob) => {
                let handle = self.handles.create(blob);
                track.live_handle = Some(handle.clone());
                debug!(id = %id, "Rehydrated stored track");
                Some((id, handle))
            }
            RehydrationOutcome::Missing => {
                track.asset_missing = true;
                warn!(id = %id, key = %key, "Stored asset missing, track is unplayable");
                self.warnings.push(PlaybackError::AssetMissing { id, key });
                None
            }
            RehydrationOutcome::Failed(e) => {
                warn!(id = %id, error = %e, "Rehydration failed, track stays pending");
                self.warnings.push(e);
                None
            }
        }
    }

    /// Unique id of the form `<unix-millis>-<suffix>`
    fn fresh_id(&self) -> TrackId {
        let millis = chrono::Utc::now().timestamp_millis();
        let mut rng = rand::thread_rng();

        loop {
            let candidate = TrackId::new(format!("{millis}-{}", rng.gen_range(0..1000)));
            if self.position_of(&candidate).is_none() {
                return candidate;
            }
        }
    }
}

impl std::fmt::Debug for PlaylistModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaylistModel")
            .field("tracks", &self.tracks)
            .field("handles", &self.handles)
            .field("snapshot_name", &self.snapshot_name)
            .finish_non_exhaustive()
    }
}

/// Title for a local file: the name without its last extension
///
/// Names that are nothing but an extension keep their full text.
pub fn title_from_file_name(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(dot) if dot > 0 && dot + 1 < file_name.len() && !file_name[dot + 1..].contains('/') => {
            file_name[..dot].to_string()
        }
        _ => file_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_storage::{MemoryAssetStore, MemorySnapshotStore};
    use futures_util::StreamExt;

    fn stores() -> (Arc<MemorySnapshotStore>, Arc<MemoryAssetStore>) {
        (
            Arc::new(MemorySnapshotStore::new()),
            Arc::new(MemoryAssetStore::new()),
        )
    }

    #[test]
    fn title_strips_last_extension() {
        assert_eq!(title_from_file_name("song.mp3"), "song");
        assert_eq!(title_from_file_name("my.live.set.flac"), "my.live.set");
        assert_eq!(title_from_file_name("no_extension"), "no_extension");
        assert_eq!(title_from_file_name(".mp3"), ".mp3");
        assert_eq!(title_from_file_name("trailing."), "trailing.");
    }

    #[tokio::test]
    async fn load_without_snapshot_uses_defaults() {
        let (snapshots, assets) = stores();
        let mut playlist = PlaylistModel::load(snapshots, assets, &PlaybackConfig::default()).await;

        assert_eq!(playlist.len(), 2);
        assert!(playlist.take_warnings().is_empty());
    }

    #[tokio::test]
    async fn load_malformed_snapshot_warns_and_uses_defaults() {
        let snapshots = Arc::new(MemorySnapshotStore::with_document("music_playlist", "{oops"));
        let assets = Arc::new(MemoryAssetStore::new());
        let mut playlist = PlaylistModel::load(snapshots, assets, &PlaybackConfig::default()).await;

        assert_eq!(playlist.len(), 2);
        assert!(matches!(
            playlist.take_warnings().as_slice(),
            [PlaybackError::MalformedSnapshot(_)]
        ));
    }

    #[tokio::test]
    async fn add_local_stores_blob_and_creates_handle() {
        let (snapshots, assets) = stores();
        let mut playlist =
            PlaylistModel::load(snapshots, assets.clone(), &PlaybackConfig::default()).await;

        let id = playlist
            .add_local(Blob::with_content_type(vec![1, 2, 3], "audio/mpeg"), "demo.mp3")
            .await;

        let track = playlist.get(2).unwrap();
        assert_eq!(track.id, id);
        assert_eq!(track.title, "demo");
        assert_eq!(track.artist, "Local");
        assert_eq!(track.color.to_string(), "#f97316");
        assert!(track.is_playable());

        let key = StorageKey::for_track(&id);
        assert_eq!(track.storage_key(), Some(&key));
        assert!(assets.contains(&key).await.unwrap());
        assert_eq!(playlist.handle_stats().live, 1);

        let (millis, suffix) = id.as_str().split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert!(suffix.parse::<u32>().unwrap() < 1000);
    }

    #[tokio::test]
    async fn remove_releases_handle_and_deletes_blob() {
        let (snapshots, assets) = stores();
        let mut playlist =
            PlaylistModel::load(snapshots, assets.clone(), &PlaybackConfig::default()).await;
        let id = playlist.add_local(Blob::new(vec![0; 8]), "a.wav").await;

        let removed = playlist.remove(&id).await.unwrap();
        assert_eq!(removed.index, 2);
        assert!(removed.track.live_handle.is_none());
        assert!(!assets.contains(&StorageKey::for_track(&id)).await.unwrap());

        let stats = playlist.handle_stats();
        assert_eq!((stats.created, stats.released, stats.live), (1, 1, 0));

        assert!(playlist.remove(&id).await.is_none());
    }

    #[tokio::test]
    async fn rehydration_restores_found_and_flags_missing() {
        let document = r##"[
            {"id": "found", "title": "F", "artist": "Local", "color": "#f97316", "storageKey": "file-found"},
            {"id": "gone", "title": "G", "artist": "Local", "color": "#f97316", "storageKey": "file-gone"}
        ]"##;
        let snapshots = Arc::new(MemorySnapshotStore::with_document("music_playlist", document));
        let assets = Arc::new(MemoryAssetStore::new());
        assets
            .put(&StorageKey::new("file-found"), Blob::new(vec![4; 4]))
            .await
            .unwrap();

        let mut playlist = PlaylistModel::load(snapshots, assets, &PlaybackConfig::default()).await;
        let mut pending = playlist.rehydrate();
        assert_eq!(pending.len(), 2);

        let mut restored = Vec::new();
        while let Some(result) = pending.next().await {
            restored.extend(playlist.apply_rehydration(result));
        }

        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].0.as_str(), "found");
        assert!(playlist.get(0).unwrap().is_playable());

        let gone = playlist.get(1).unwrap();
        assert!(gone.asset_missing);
        assert!(!gone.is_playable());
        assert!(matches!(
            playlist.take_warnings().as_slice(),
            [PlaybackError::AssetMissing { .. }]
        ));

        // Nothing left to do
        assert!(playlist.rehydrate().is_empty());
    }

    #[tokio::test]
    async fn rehydration_for_removed_track_is_dropped() {
        let document = r##"[{"id": "x", "title": "X", "artist": "Local", "color": "#f97316", "storageKey": "file-x"}]"##;
        let snapshots = Arc::new(MemorySnapshotStore::with_document("music_playlist", document));
        let assets = Arc::new(MemoryAssetStore::new());
        assets
            .put(&StorageKey::new("file-x"), Blob::new(vec![1]))
            .await
            .unwrap();

        let mut playlist = PlaylistModel::load(snapshots, assets, &PlaybackConfig::default()).await;
        let mut pending = playlist.rehydrate();
        let result = pending.next().await.unwrap();

        playlist.remove(&TrackId::new("x")).await;
        assert!(playlist.apply_rehydration(result).is_none());
        assert_eq!(playlist.handle_stats().created, 0);
    }

    #[tokio::test]
    async fn duplicate_rehydration_creates_one_handle() {
        let document = r##"[{"id": "x", "title": "X", "artist": "Local", "color": "#f97316", "storageKey": "file-x"}]"##;
        let snapshots = Arc::new(MemorySnapshotStore::with_document("music_playlist", document));
        let assets = Arc::new(MemoryAssetStore::new());
        assets
            .put(&StorageKey::new("file-x"), Blob::new(vec![1]))
            .await
            .unwrap();

        let mut playlist = PlaylistModel::load(snapshots, assets, &PlaybackConfig::default()).await;
        let first = playlist.rehydrate().next().await.unwrap();
        let second = playlist.rehydrate().next().await.unwrap();

        assert!(playlist.apply_rehydration(first).is_some());
        assert!(playlist.apply_rehydration(second).is_none());
        assert_eq!(playlist.handle_stats().live, 1);
    }

    #[tokio::test]
    async fn persist_writes_safe_snapshot() {
        let (snapshots, assets) = stores();
        let mut playlist =
            PlaylistModel::load(snapshots.clone(), assets, &PlaybackConfig::default()).await;
        playlist.add_local(Blob::new(vec![1]), "local.ogg").await;
        playlist.persist().await;

        let document = snapshots.read("music_playlist").await.unwrap().unwrap();
        assert!(!document.contains("blob:"));
        assert!(document.contains("\"storageKey\":\"file-"));
        assert!(document.contains("SoundHelix-Song-1.mp3"));
    }
}
