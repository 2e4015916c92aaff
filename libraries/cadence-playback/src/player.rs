//! Player - owns the playlist and the controller and sequences them
//!
//! Every mutation goes through `&mut self`, so a playlist change and the
//! controller renumbering that follows it are one logical step.

use crate::{
    controller::PlaybackController,
    error::{PlaybackError, Result},
    events::{PlayerEvent, SubscriptionId},
    handles::HandleStats,
    media::{MediaElement, MediaEvent},
    playlist::{PlaylistModel, Rehydrated, Rehydration, RehydrationOutcome},
    theme::{Theme, derive_theme},
    types::{PlaybackConfig, PlaybackStatus},
    visualizer::VisualizerFeed,
};
use cadence_core::{AssetStore, Blob, ObjectUrl, SnapshotStore, Track, TrackId};
use futures_util::StreamExt;
use std::sync::Arc;
use tracing::{debug, info};

/// Tally of a full rehydration pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RehydrationReport {
    /// Tracks that regained a live handle
    pub restored: usize,
    /// Tracks whose blob is gone
    pub missing: usize,
    /// Lookups that failed and left the track pending
    pub failed: usize,
    /// Results dropped because the track was removed or already restored
    pub dropped: usize,
}

/// A player session
pub struct Player<M: MediaElement> {
    playlist: PlaylistModel,
    controller: PlaybackController<M>,
    config: PlaybackConfig,
    startup_warnings: Vec<PlaybackError>,
    closed: bool,
}

impl<M: MediaElement> Player<M> {
    /// Open a session: load the playlist and bind its first track
    ///
    /// # Errors
    /// Returns `InvalidConfig` if `config` fails validation. Store failures
    /// are not errors; they show up in `startup_warnings`.
    pub async fn open(
        media: M,
        assets: Arc<dyn AssetStore>,
        snapshots: Arc<dyn SnapshotStore>,
        config: PlaybackConfig,
    ) -> Result<Self> {
        config.validate()?;

        let playlist = PlaylistModel::load(snapshots, assets, &config).await;
        Ok(Self::assemble(media, playlist, config).await)
    }

    /// Open a session over an already-built playlist
    pub async fn with_playlist(
        media: M,
        playlist: PlaylistModel,
        config: PlaybackConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(media, playlist, config).await)
    }

    async fn assemble(media: M, mut playlist: PlaylistModel, config: PlaybackConfig) -> Self {
        playlist.persist().await;
        let startup_warnings = playlist.take_warnings();

        let mut controller = PlaybackController::new(media, &config);
        controller.sync(playlist.tracks());

        info!(tracks = playlist.len(), "Opened player session");
        Self {
            playlist,
            controller,
            config,
            startup_warnings,
            closed: false,
        }
    }

    /// Use a fixed seed for shuffle picks
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.controller = self.controller.with_seed(seed);
        self
    }

    // ===== Observation =====

    /// Register an event callback
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&PlayerEvent) + Send + 'static,
    {
        self.controller.subscribe(callback)
    }

    /// Remove an event callback
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.controller.unsubscribe(id)
    }

    /// Warnings raised while opening, before anyone could subscribe
    pub fn startup_warnings(&self) -> &[PlaybackError] {
        &self.startup_warnings
    }

    // ===== Read access =====

    /// Tracks in navigation order
    pub fn tracks(&self) -> &[Track] {
        self.playlist.tracks()
    }

    /// Playback status
    pub fn status(&self) -> &PlaybackStatus {
        self.controller.status()
    }

    /// The selected track
    pub fn current_track(&self) -> Option<&Track> {
        self.playlist.get(self.controller.status().current_index)
    }

    /// Theme for the selected track
    pub fn theme(&self) -> Theme {
        match self.current_track() {
            Some(track) => derive_theme(Some(track)),
            None => Theme::from_primary(self.config.default_color),
        }
    }

    /// What a visualizer attaches to, once the bound source is ready
    pub fn visualizer_feed(&self) -> Option<VisualizerFeed<'_>> {
        if self.closed || !self.controller.is_source_ready() {
            return None;
        }
        Some(VisualizerFeed::new(self.controller.media(), self.theme()))
    }

    /// Live handle counters
    pub fn handle_stats(&self) -> HandleStats {
        self.playlist.handle_stats()
    }

    /// The playlist model
    pub fn playlist(&self) -> &PlaylistModel {
        &self.playlist
    }

    /// The driven media element
    pub fn media(&self) -> &M {
        self.controller.media()
    }

    /// Mutable access to the media element
    pub fn media_mut(&mut self) -> &mut M {
        self.controller.media_mut()
    }

    /// Whether `shutdown` was called
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    // ===== Playlist =====

    /// Add a local file, persist, and start playing it
    ///
    /// After `shutdown` the file is still stored and listed, but it gets no
    /// live handle and nothing is played.
    pub async fn add_local(&mut self, blob: Blob, file_name: &str) -> TrackId {
        let id = self.playlist.add_local(blob, file_name).await;
        self.after_append(&[id.clone()]).await;
        id
    }

    /// Add several local files in order and start playing the first
    pub async fn add_local_files<I, S>(&mut self, files: I) -> Vec<TrackId>
    where
        I: IntoIterator<Item = (Blob, S)>,
        S: AsRef<str>,
    {
        let mut added = Vec::new();
        for (blob, name) in files {
            added.push(self.playlist.add_local(blob, name.as_ref()).await);
        }

        if !added.is_empty() {
            self.after_append(&added).await;
        }
        added
    }

    async fn after_append(&mut self, added: &[TrackId]) {
        self.playlist.persist().await;
        self.flush_warnings();
        self.controller.emit(PlayerEvent::PlaylistChanged {
            len: self.playlist.len(),
        });

        if self.closed {
            // Stored for the next session; nothing may stay live after teardown
            let released = self.playlist.release_all_handles();
            debug!(released, "Released handles of tracks added after shutdown");
            return;
        }

        let first = added.first().and_then(|id| self.playlist.position_of(id));
        if let Some(index) = first {
            self.controller.go_to(self.playlist.tracks(), index);
        }
    }

    /// Remove a track by id; returns whether it existed
    pub async fn remove(&mut self, id: &TrackId) -> bool {
        let Some(removed) = self.playlist.remove(id).await else {
            debug!(id = %id, "Remove of unknown track ignored");
            return false;
        };

        if !self.closed {
            self.controller
                .track_removed(self.playlist.tracks(), removed.index);
        }
        self.playlist.persist().await;
        self.flush_warnings();
        self.controller.emit(PlayerEvent::PlaylistChanged {
            len: self.playlist.len(),
        });
        true
    }

    // ===== Rehydration =====

    /// Start lookups for every stored track still waiting for its blob
    pub fn rehydrate(&self) -> Rehydration {
        self.playlist.rehydrate()
    }

    /// Apply one lookup result
    ///
    /// No-op after `shutdown`. When the selected track gains a handle, the
    /// media element is rebound to it.
    pub fn apply_rehydration(&mut self, result: Rehydrated) -> Option<(TrackId, ObjectUrl)> {
        if self.closed {
            debug!(id = %result.id, "Ignoring rehydration after shutdown");
            return None;
        }

        let applied = self.playlist.apply_rehydration(result);
        self.flush_warnings();

        if let Some((id, _)) = &applied {
            self.controller.emit(PlayerEvent::TrackRehydrated {
                track_id: id.clone(),
            });
            self.controller.sync(self.playlist.tracks());
        }
        applied
    }

    /// Run every pending lookup to completion
    pub async fn rehydrate_all(&mut self) -> RehydrationReport {
        let mut report = RehydrationReport::default();
        let mut pending = self.rehydrate();

        while let Some(result) = pending.next().await {
            let found = matches!(result.outcome, RehydrationOutcome::Found(_));
            let failed = matches!(result.outcome, RehydrationOutcome::Failed(_));
            let was_pending = !self.closed
                && self
                    .playlist
                    .position_of(&result.id)
                    .and_then(|index| self.playlist.get(index))
                    .is_some_and(Track::needs_rehydration);

            if self.apply_rehydration(result).is_some() {
                report.restored += 1;
            } else if !was_pending || found {
                report.dropped += 1;
            } else if failed {
                report.failed += 1;
            } else {
                report.missing += 1;
            }
        }

        info!(?report, "Rehydration finished");
        report
    }

    // ===== Transport =====

    /// Select a track; selecting the current one toggles play/pause
    pub fn select_track(&mut self, index: usize) {
        if self.closed {
            return;
        }
        self.controller.select_track(self.playlist.tracks(), index);
    }

    /// Toggle between playing and paused
    pub fn toggle_play(&mut self) {
        if self.closed {
            return;
        }
        self.controller.toggle_play();
    }

    /// Start or resume playback
    pub fn play(&mut self) {
        if self.closed {
            return;
        }
        self.controller.play();
    }

    /// Pause playback
    pub fn pause(&mut self) {
        self.controller.pause();
    }

    /// Next track (random when shuffling)
    pub fn next(&mut self) {
        if self.closed {
            return;
        }
        self.controller.next(self.playlist.tracks());
    }

    /// Restart, or previous track near the start
    pub fn previous(&mut self) {
        if self.closed {
            return;
        }
        self.controller.previous(self.playlist.tracks());
    }

    /// Seek within the current track
    pub fn seek(&mut self, seconds: f64) {
        if self.closed {
            return;
        }
        self.controller.seek(seconds);
    }

    /// Set volume in `[0, 1]`
    pub fn set_volume(&mut self, volume: f32) {
        self.controller.set_volume(volume);
    }

    /// Toggle mute
    pub fn toggle_mute(&mut self) {
        self.controller.toggle_mute();
    }

    /// Enable or disable shuffle
    pub fn set_shuffle(&mut self, enabled: bool) {
        self.controller.set_shuffle(enabled);
    }

    /// Enable or disable looping
    pub fn set_loop(&mut self, enabled: bool) {
        self.controller.set_loop(enabled);
    }

    /// Feed an event from the media element
    pub fn handle_media_event(&mut self, event: MediaEvent) {
        if self.closed {
            return;
        }
        self.controller
            .handle_media_event(self.playlist.tracks(), event);
    }

    // ===== Teardown =====

    /// End the session: stop, detach, release every live handle
    ///
    /// Returns how many handles were released. Idempotent. Afterwards
    /// transport calls are ignored and never rebind the media element.
    pub fn shutdown(&mut self) -> usize {
        if self.closed {
            return 0;
        }

        self.controller.shutdown();
        let released = self.playlist.release_all_handles();
        self.closed = true;

        info!(released, "Player session closed");
        released
    }

    fn flush_warnings(&mut self) {
        for warning in self.playlist.take_warnings() {
            self.controller.emit(PlayerEvent::Warning(warning));
        }
    }
}

impl<M: MediaElement + std::fmt::Debug> std::fmt::Debug for Player<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("playlist", &self.playlist)
            .field("controller", &self.controller)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}
