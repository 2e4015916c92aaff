//! End-to-end player scenarios
//!
//! Drives a `Player` over in-memory stores and a headless media element the
//! way a UI would: open, rehydrate, add, select, remove, shut down.

use async_trait::async_trait;
use cadence_core::{AssetStore, Blob, CoreError, SnapshotStore, StorageKey, TrackId};
use cadence_playback::{
    HeadlessMedia, MediaElement, MediaEvent, PlaybackConfig, PlaybackError, PlaybackState, Player,
    PlayerEvent,
};
use cadence_storage::{MemoryAssetStore, MemorySnapshotStore};
use futures_util::StreamExt;
use std::sync::{Arc, Mutex};

// ===== Helpers =====

/// Asset store whose every operation fails
struct BrokenAssetStore;

#[async_trait]
impl AssetStore for BrokenAssetStore {
    async fn put(&self, _key: &StorageKey, _blob: Blob) -> cadence_core::Result<()> {
        Err(CoreError::storage_unavailable("quota exceeded"))
    }

    async fn get(&self, _key: &StorageKey) -> cadence_core::Result<Option<Blob>> {
        Err(CoreError::storage_unavailable("database closed"))
    }

    async fn delete(&self, _key: &StorageKey) -> cadence_core::Result<()> {
        Err(CoreError::storage_unavailable("database closed"))
    }
}

/// Asset store that refuses every key, like a filesystem store given `../x`
struct RejectingAssetStore;

#[async_trait]
impl AssetStore for RejectingAssetStore {
    async fn put(&self, key: &StorageKey, _blob: Blob) -> cadence_core::Result<()> {
        Err(CoreError::invalid_key(key.as_str()))
    }

    async fn get(&self, key: &StorageKey) -> cadence_core::Result<Option<Blob>> {
        Err(CoreError::invalid_key(key.as_str()))
    }

    async fn delete(&self, key: &StorageKey) -> cadence_core::Result<()> {
        Err(CoreError::invalid_key(key.as_str()))
    }
}

/// Snapshot store whose writes fail
struct ReadOnlySnapshots(MemorySnapshotStore);

#[async_trait]
impl SnapshotStore for ReadOnlySnapshots {
    async fn read(&self, name: &str) -> cadence_core::Result<Option<String>> {
        self.0.read(name).await
    }

    async fn write(&self, _name: &str, _contents: &str) -> cadence_core::Result<()> {
        Err(CoreError::storage_unavailable("storage disabled"))
    }
}

const MIXED_SNAPSHOT: &str = r##"[
    {"id": "a", "title": "Remote A", "artist": "Band", "color": "#10b981",
     "url": "https://example.com/a.mp3"},
    {"id": "b", "title": "Local B", "artist": "Local", "color": "#f97316",
     "storageKey": "file-b", "local": true}
]"##;

async fn open(
    assets: Arc<dyn AssetStore>,
    snapshots: Arc<dyn SnapshotStore>,
) -> Player<HeadlessMedia> {
    Player::open(HeadlessMedia::new(), assets, snapshots, PlaybackConfig::default())
        .await
        .expect("default config is valid")
        .with_seed(11)
}

async fn open_mixed(assets: Arc<MemoryAssetStore>) -> Player<HeadlessMedia> {
    let snapshots = Arc::new(MemorySnapshotStore::with_document("music_playlist", MIXED_SNAPSHOT));
    open(assets, snapshots).await
}

fn record_events(player: &mut Player<HeadlessMedia>) -> Arc<Mutex<Vec<PlayerEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    player.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
    events
}

fn warnings(events: &Mutex<Vec<PlayerEvent>>) -> Vec<PlaybackError> {
    events
        .lock()
        .unwrap()
        .iter()
        .filter_map(|event| match event {
            PlayerEvent::Warning(e) => Some(e.clone()),
            _ => None,
        })
        .collect()
}

// ===== Opening =====

#[tokio::test]
async fn fresh_session_gets_default_playlist_and_persists_it() {
    let snapshots = Arc::new(MemorySnapshotStore::new());
    let player = open(Arc::new(MemoryAssetStore::new()), snapshots.clone()).await;

    assert_eq!(player.tracks().len(), 2);
    assert_eq!(player.tracks()[0].title, "SoundHelix Song 1");
    assert_eq!(player.status().current_index, 0);
    assert_eq!(player.status().state, PlaybackState::Loading);
    assert!(!player.status().is_playing);
    assert_eq!(player.status().volume, 0.9);
    assert!(player.startup_warnings().is_empty());

    let document = snapshots.read("music_playlist").await.unwrap().unwrap();
    assert!(document.contains("SoundHelix-Song-2.mp3"));
}

#[tokio::test]
async fn malformed_snapshot_falls_back_with_warning() {
    let snapshots = Arc::new(MemorySnapshotStore::with_document("music_playlist", "[{]"));
    let player = open(Arc::new(MemoryAssetStore::new()), snapshots).await;

    assert_eq!(player.tracks().len(), 2);
    assert!(matches!(
        player.startup_warnings(),
        [PlaybackError::MalformedSnapshot(_)]
    ));
}

#[tokio::test]
async fn invalid_config_is_rejected() {
    let config = PlaybackConfig {
        initial_volume: 2.0,
        ..PlaybackConfig::default()
    };
    let result = Player::open(
        HeadlessMedia::new(),
        Arc::new(MemoryAssetStore::new()),
        Arc::new(MemorySnapshotStore::new()),
        config,
    )
    .await;
    assert!(matches!(result, Err(PlaybackError::InvalidConfig(_))));
}

// ===== Rehydration =====

#[tokio::test]
async fn missing_blob_flags_track_and_keeps_remote_selectable() {
    let mut player = open_mixed(Arc::new(MemoryAssetStore::new())).await;
    let events = record_events(&mut player);

    let report = player.rehydrate_all().await;
    assert_eq!(report.missing, 1);
    assert_eq!(report.restored, 0);

    let b = &player.tracks()[1];
    assert!(b.asset_missing);
    assert!(!b.is_playable());
    assert!(player.tracks()[0].is_playable());

    // Selecting the unplayable track does nothing
    let before = player.status().clone();
    player.select_track(1);
    assert_eq!(player.status(), &before);

    // The remote track still plays
    player.select_track(0);
    assert!(player.status().is_playing);

    assert!(matches!(
        warnings(&events).as_slice(),
        [PlaybackError::AssetMissing { .. }]
    ));
}

#[tokio::test]
async fn rehydrated_current_track_is_bound() {
    let assets = Arc::new(MemoryAssetStore::new());
    assets
        .put(&StorageKey::new("file-b"), Blob::new(vec![3; 32]))
        .await
        .unwrap();
    let snapshots = Arc::new(MemorySnapshotStore::with_document(
        "music_playlist",
        r##"[{"id": "b", "title": "Local B", "artist": "Local", "color": "#f97316", "storageKey": "file-b"}]"##,
    ));
    let mut player = open(assets, snapshots).await;
    assert_eq!(player.status().state, PlaybackState::Idle);
    assert_eq!(player.media().src(), None);

    let report = player.rehydrate_all().await;
    assert_eq!(report.restored, 1);

    let handle = player.tracks()[0].live_handle.clone().unwrap();
    assert_eq!(player.media().src(), Some(handle.as_str()));
    assert_eq!(player.status().state, PlaybackState::Loading);
    assert_eq!(player.handle_stats().live, 1);
}

#[tokio::test]
async fn store_failure_leaves_track_pending() {
    let snapshots = Arc::new(MemorySnapshotStore::with_document("music_playlist", MIXED_SNAPSHOT));
    let mut player = open(Arc::new(BrokenAssetStore), snapshots).await;

    let report = player.rehydrate_all().await;
    assert_eq!(report.failed, 1);
    assert!(player.tracks()[1].needs_rehydration());

    // A later pass retries it
    assert_eq!(player.rehydrate().len(), 1);
}

#[tokio::test]
async fn completions_after_shutdown_are_ignored() {
    let assets = Arc::new(MemoryAssetStore::new());
    assets
        .put(&StorageKey::new("file-b"), Blob::new(vec![1; 4]))
        .await
        .unwrap();
    let mut player = open_mixed(assets).await;

    let mut pending = player.rehydrate();
    player.shutdown();

    while let Some(result) = pending.next().await {
        assert!(player.apply_rehydration(result).is_none());
    }
    assert_eq!(player.handle_stats().created, 0);
}

#[tokio::test]
async fn rejected_key_is_treated_as_missing() {
    let snapshots = Arc::new(MemorySnapshotStore::with_document("music_playlist", MIXED_SNAPSHOT));
    let mut player = open(Arc::new(RejectingAssetStore), snapshots).await;
    let events = record_events(&mut player);

    let report = player.rehydrate_all().await;
    assert_eq!((report.missing, report.failed), (1, 0));

    let b = &player.tracks()[1];
    assert!(b.asset_missing);
    assert!(!b.needs_rehydration());
    assert!(player.rehydrate().is_empty());
    assert!(matches!(
        warnings(&events).as_slice(),
        [PlaybackError::AssetMissing { .. }]
    ));
}

// ===== Adding local files =====

#[tokio::test]
async fn adding_file_selects_and_plays_it() {
    let assets = Arc::new(MemoryAssetStore::new());
    let mut player = open(assets.clone(), Arc::new(MemorySnapshotStore::new())).await;

    let id = player
        .add_local(Blob::with_content_type(vec![0; 64], "audio/mpeg"), "Night Drive.mp3")
        .await;

    let current = player.current_track().unwrap();
    assert_eq!(current.id, id);
    assert_eq!(current.title, "Night Drive");
    assert_eq!(current.artist, "Local");
    assert_eq!(player.status().current_index, 2);
    assert!(player.status().is_playing);
    assert_eq!(player.status().state, PlaybackState::Playing);
    assert_eq!(player.media().src(), current.resolved_source());
    assert!(assets.contains(&StorageKey::for_track(&id)).await.unwrap());
}

#[tokio::test]
async fn adding_several_files_selects_the_first() {
    let mut player = open(
        Arc::new(MemoryAssetStore::new()),
        Arc::new(MemorySnapshotStore::new()),
    )
    .await;

    let added = player
        .add_local_files(vec![
            (Blob::new(vec![1]), "one.mp3"),
            (Blob::new(vec![2]), "two.mp3"),
            (Blob::new(vec![3]), "three.mp3"),
        ])
        .await;

    assert_eq!(added.len(), 3);
    assert_eq!(player.tracks().len(), 5);
    assert_eq!(player.current_track().unwrap().id, added[0]);
    assert_eq!(player.current_track().unwrap().title, "one");
    assert!(player.status().is_playing);
}

#[tokio::test]
async fn adding_to_empty_playlist_plays_new_track() {
    let snapshots = Arc::new(MemorySnapshotStore::with_document("music_playlist", "[]"));
    let mut player = open(Arc::new(MemoryAssetStore::new()), snapshots).await;
    assert!(player.tracks().is_empty());
    assert_eq!(player.status().state, PlaybackState::Idle);

    player.add_local(Blob::new(vec![5; 5]), "solo.ogg").await;

    assert_eq!(player.status().current_index, 0);
    assert_eq!(player.status().state, PlaybackState::Playing);
}

#[tokio::test]
async fn failed_blob_write_still_plays_this_session() {
    let mut player = open(Arc::new(BrokenAssetStore), Arc::new(MemorySnapshotStore::new())).await;
    let events = record_events(&mut player);

    let id = player.add_local(Blob::new(vec![9; 9]), "volatile.wav").await;

    let track = player.current_track().unwrap();
    assert_eq!(track.id, id);
    assert!(track.is_playable());
    assert!(track.storage_key().is_some());
    assert!(matches!(
        warnings(&events).as_slice(),
        [PlaybackError::StorageUnavailable(_)]
    ));
}

#[tokio::test]
async fn snapshot_write_failure_is_swallowed() {
    let snapshots = Arc::new(ReadOnlySnapshots(MemorySnapshotStore::new()));
    let mut player = open(Arc::new(MemoryAssetStore::new()), snapshots).await;
    assert!(matches!(
        player.startup_warnings(),
        [PlaybackError::StorageUnavailable(_)]
    ));

    player.add_local(Blob::new(vec![1]), "x.mp3").await;
    assert_eq!(player.tracks().len(), 3);
}

// ===== Removal =====

#[tokio::test]
async fn removing_current_local_track_cleans_up() {
    let assets = Arc::new(MemoryAssetStore::new());
    let snapshots = Arc::new(MemorySnapshotStore::new());
    let mut player = open(assets.clone(), snapshots.clone()).await;
    let id = player.add_local(Blob::new(vec![7; 7]), "gone.mp3").await;
    let handle = player.current_track().unwrap().live_handle.clone().unwrap();

    assert!(player.remove(&id).await);

    assert!(!assets.contains(&StorageKey::for_track(&id)).await.unwrap());
    assert!(!player.playlist().handles().is_live(&handle));
    assert_eq!(player.status().current_index, 1);
    assert!(player.status().is_playing);
    assert_eq!(player.media().src(), player.tracks()[1].resolved_source());

    let document = snapshots.read("music_playlist").await.unwrap().unwrap();
    assert!(!document.contains(id.as_str()));
}

#[tokio::test]
async fn removing_everything_stops_playback() {
    let mut player = open(
        Arc::new(MemoryAssetStore::new()),
        Arc::new(MemorySnapshotStore::new()),
    )
    .await;
    player.play();

    assert!(player.remove(&TrackId::new("1")).await);
    assert!(player.remove(&TrackId::new("2")).await);
    assert!(!player.remove(&TrackId::new("2")).await);

    assert!(player.tracks().is_empty());
    assert!(player.current_track().is_none());
    assert!(!player.status().is_playing);
    assert_eq!(player.status().state, PlaybackState::Idle);
    assert_eq!(player.theme().primary.to_string(), "#6366f1");
}

// ===== Transport =====

#[tokio::test]
async fn previous_restarts_then_goes_back() {
    let mut player = open(
        Arc::new(MemoryAssetStore::new()),
        Arc::new(MemorySnapshotStore::new()),
    )
    .await;
    player.select_track(1);
    player.handle_media_event(MediaEvent::TimeUpdate(10.0));

    player.previous();
    assert_eq!(player.status().current_index, 1);
    assert_eq!(player.status().position, 0.0);

    player.previous();
    assert_eq!(player.status().current_index, 0);
}

#[tokio::test]
async fn volume_zero_then_unmute_restores() {
    let mut player = open(
        Arc::new(MemoryAssetStore::new()),
        Arc::new(MemorySnapshotStore::new()),
    )
    .await;

    player.set_volume(0.0);
    assert!(player.status().muted);

    player.toggle_mute();
    assert!(!player.status().muted);
    assert_eq!(player.status().volume, 0.9);
}

#[tokio::test]
async fn visualizer_feed_waits_for_metadata() {
    let mut player = open(
        Arc::new(MemoryAssetStore::new()),
        Arc::new(MemorySnapshotStore::new()),
    )
    .await;
    assert!(player.visualizer_feed().is_none());

    player.handle_media_event(MediaEvent::LoadedMetadata { duration: 372.0 });

    let feed = player.visualizer_feed().expect("feed after metadata");
    assert_eq!(
        feed.src(),
        Some("https://www.soundhelix.com/examples/mp3/SoundHelix-Song-1.mp3")
    );
    assert_eq!(feed.theme().primary.to_string(), "#10b981");
    assert_eq!(feed.theme(), player.theme());

    player.next();
    assert!(player.visualizer_feed().is_none());
}

#[tokio::test]
async fn rejected_autoplay_reverts_to_paused() {
    let mut player = open(
        Arc::new(MemoryAssetStore::new()),
        Arc::new(MemorySnapshotStore::new()),
    )
    .await;
    let events = record_events(&mut player);
    player.media_mut().reject_play(Some("NotAllowedError"));

    player.select_track(1);

    assert_eq!(player.status().current_index, 1);
    assert!(!player.status().is_playing);
    assert!(matches!(
        warnings(&events).as_slice(),
        [PlaybackError::PlaybackRejected(_)]
    ));
}

// ===== Teardown =====

#[tokio::test]
async fn shutdown_releases_every_handle_once() {
    let assets = Arc::new(MemoryAssetStore::new());
    assets
        .put(&StorageKey::new("file-b"), Blob::new(vec![2; 2]))
        .await
        .unwrap();
    let mut player = open_mixed(assets).await;
    player.rehydrate_all().await;
    player.add_local(Blob::new(vec![1]), "extra.mp3").await;
    assert_eq!(player.handle_stats().live, 2);

    assert_eq!(player.shutdown(), 2);
    assert_eq!(player.shutdown(), 0);

    let stats = player.handle_stats();
    assert_eq!((stats.created, stats.released, stats.live), (2, 2, 0));
    assert!(player.is_closed());
    assert_eq!(player.media().src(), None);
    assert!(player.tracks().iter().all(|t| t.live_handle.is_none()));
}

#[tokio::test]
async fn files_added_after_shutdown_are_stored_but_never_live() {
    let assets = Arc::new(MemoryAssetStore::new());
    let mut player = open(assets.clone(), Arc::new(MemorySnapshotStore::new())).await;
    player.shutdown();
    player.media_mut().take_calls();

    let id = player.add_local(Blob::new(vec![1]), "late.mp3").await;

    let stats = player.handle_stats();
    assert_eq!((stats.created, stats.released, stats.live), (1, 1, 0));
    assert_eq!(player.shutdown(), 0);

    assert!(player.media().calls().is_empty());
    assert_eq!(player.media().src(), None);
    assert!(!player.status().is_playing);

    // Kept durable for the next session
    let track = player.tracks().iter().find(|t| t.id == id).unwrap();
    assert!(track.needs_rehydration());
    assert!(assets.contains(&StorageKey::for_track(&id)).await.unwrap());
}

#[tokio::test]
async fn transport_after_shutdown_never_rebinds() {
    let mut player = open(
        Arc::new(MemoryAssetStore::new()),
        Arc::new(MemorySnapshotStore::new()),
    )
    .await;
    player.select_track(1);
    player.shutdown();
    player.media_mut().take_calls();

    player.select_track(0);
    player.next();
    player.previous();
    player.play();
    player.toggle_play();
    player.seek(3.0);
    assert!(player.remove(&TrackId::new("1")).await);

    assert!(player.media().calls().is_empty());
    assert_eq!(player.media().src(), None);
    let status = player.status();
    assert!(!status.is_playing);
    assert_eq!(status.state, PlaybackState::Idle);
    assert_eq!(player.tracks().len(), 1);
}

#[tokio::test]
async fn unsubscribed_observer_stops_receiving() {
    let mut player = open(
        Arc::new(MemoryAssetStore::new()),
        Arc::new(MemorySnapshotStore::new()),
    )
    .await;
    let events = Arc::new(Mutex::new(0usize));
    let sink = Arc::clone(&events);
    let id = player.subscribe(move |_| *sink.lock().unwrap() += 1);

    player.set_shuffle(true);
    let seen = *events.lock().unwrap();
    assert!(seen > 0);

    assert!(player.unsubscribe(id));
    player.set_loop(true);
    assert_eq!(*events.lock().unwrap(), seen);
}
