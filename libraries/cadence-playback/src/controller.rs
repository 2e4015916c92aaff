//! Playback controller - the transport state machine
//!
//! Owns the media element and the derived playback status. Track data is
//! owned elsewhere (the playlist model) and passed in by reference, so the
//! controller always navigates the playlist as it is right now.

use crate::{
    error::PlaybackError,
    events::{EventBus, PlayerEvent, SubscriptionId},
    media::{MediaElement, MediaEvent},
    shuffle,
    types::{PlaybackConfig, PlaybackState, PlaybackStatus},
    volume::Volume,
};
use cadence_core::Track;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, warn};

/// Transport state machine driving one media element
pub struct PlaybackController<M: MediaElement> {
    media: M,
    status: PlaybackStatus,
    volume: Volume,

    /// Source the media element is currently bound to
    bound_source: Option<String>,

    /// Whether the bound source reported metadata
    source_ready: bool,

    restart_threshold_secs: f64,
    last_reported: (PlaybackState, bool),
    events: EventBus,
    rng: StdRng,
}

impl<M: MediaElement> PlaybackController<M> {
    /// Create a controller with nothing bound
    pub fn new(mut media: M, config: &PlaybackConfig) -> Self {
        let volume = Volume::new(config.initial_volume, config.min_unmute_volume);
        media.set_volume(volume.level());

        let status = PlaybackStatus {
            current_index: 0,
            state: PlaybackState::Idle,
            is_playing: false,
            position: 0.0,
            duration: None,
            volume: volume.level(),
            muted: volume.is_muted(),
            shuffle: false,
            loop_enabled: false,
        };

        Self {
            media,
            last_reported: (status.state, status.is_playing),
            status,
            volume,
            bound_source: None,
            source_ready: false,
            restart_threshold_secs: config.restart_threshold_secs,
            events: EventBus::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Use a fixed seed for shuffle picks
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    // ===== Observation =====

    /// Register an event callback
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&PlayerEvent) + Send + 'static,
    {
        self.events.subscribe(callback)
    }

    /// Remove an event callback
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    pub(crate) fn emit(&mut self, event: PlayerEvent) {
        self.events.emit(&event);
    }

    /// Current status
    pub fn status(&self) -> &PlaybackStatus {
        &self.status
    }

    /// The driven media element
    pub fn media(&self) -> &M {
        &self.media
    }

    /// Mutable access to the media element
    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    /// Source the media element is bound to
    pub fn bound_source(&self) -> Option<&str> {
        self.bound_source.as_deref()
    }

    /// Whether the bound source reported its metadata
    pub fn is_source_ready(&self) -> bool {
        self.source_ready
    }

    // ===== Transport =====

    /// Select a track by index
    ///
    /// Selecting the current track toggles play/pause. Out-of-range and
    /// unplayable tracks are ignored. Any other track becomes current and
    /// starts playing from the beginning.
    pub fn select_track(&mut self, tracks: &[Track], index: usize) {
        if index >= tracks.len() {
            debug!(index, len = tracks.len(), "Ignoring out-of-range selection");
            return;
        }

        if index == self.status.current_index {
            self.toggle_play();
            return;
        }

        if !tracks[index].is_playable() {
            debug!(index, id = %tracks[index].id, "Ignoring selection of unplayable track");
            return;
        }

        self.go_to(tracks, index);
    }

    /// Make `index` current and play it from the beginning
    ///
    /// Unlike `select_track`, never toggles.
    pub fn go_to(&mut self, tracks: &[Track], index: usize) {
        if index >= tracks.len() {
            return;
        }

        let previous = self.status.current_index;
        self.status.current_index = index;
        self.status.is_playing = true;

        if index != previous {
            self.emit_track_changed(tracks);
        }

        let same_source = self.bound_source.is_some()
            && self.bound_source.as_deref() == tracks[index].resolved_source();

        if index == previous && same_source {
            self.restart();
        } else {
            self.bind(tracks, true);
        }
    }

    /// Toggle between playing and paused
    pub fn toggle_play(&mut self) {
        if self.status.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Resume or start playback of the bound source
    pub fn play(&mut self) {
        self.status.is_playing = true;
        self.start_playback();
    }

    /// Pause playback
    pub fn pause(&mut self) {
        self.status.is_playing = false;
        self.media.pause();
        if self.bound_source.is_some() {
            self.status.state = PlaybackState::Paused;
        }
        self.report_state();
    }

    /// Advance to the next track
    ///
    /// Sequential order wraps around; shuffle picks uniformly among the
    /// other tracks. Always leaves the intent at playing.
    pub fn next(&mut self, tracks: &[Track]) {
        let Some(index) = shuffle::next_index(
            self.status.current_index,
            tracks.len(),
            self.status.shuffle,
            &mut self.rng,
        ) else {
            return;
        };
        self.go_to(tracks, index);
    }

    /// Restart the current track, or go back one track near its start
    pub fn previous(&mut self, tracks: &[Track]) {
        if tracks.is_empty() {
            return;
        }

        if self.status.position > self.restart_threshold_secs {
            self.seek(0.0);
            return;
        }

        if let Some(index) = shuffle::previous_index(self.status.current_index, tracks.len()) {
            self.go_to(tracks, index);
        }
    }

    /// Move the playback position
    ///
    /// Clamped to `[0, duration]`, or to `>= 0` while the duration is
    /// unknown. Non-finite input is ignored.
    pub fn seek(&mut self, seconds: f64) {
        if !seconds.is_finite() {
            return;
        }

        let seconds = match self.status.duration {
            Some(duration) => seconds.clamp(0.0, duration),
            None => seconds.max(0.0),
        };

        self.media.set_current_time(seconds);
        self.set_position(seconds);
    }

    // ===== Volume =====

    /// Set volume, clamped to `[0, 1]`; 0 mutes
    pub fn set_volume(&mut self, volume: f32) {
        if volume.is_nan() {
            return;
        }
        self.volume.set_level(volume);
        self.apply_volume();
    }

    /// Mute, or restore the level from before muting
    pub fn toggle_mute(&mut self) {
        self.volume.toggle_mute();
        self.apply_volume();
    }

    // ===== Modes =====

    /// Enable or disable shuffle
    pub fn set_shuffle(&mut self, enabled: bool) {
        if self.status.shuffle != enabled {
            self.status.shuffle = enabled;
            self.emit(PlayerEvent::ShuffleChanged(enabled));
        }
    }

    /// Enable or disable looping the current track
    pub fn set_loop(&mut self, enabled: bool) {
        if self.status.loop_enabled != enabled {
            self.status.loop_enabled = enabled;
            self.emit(PlayerEvent::LoopChanged(enabled));
        }
    }

    // ===== Reactions =====

    /// React to an event from the media element
    pub fn handle_media_event(&mut self, tracks: &[Track], event: MediaEvent) {
        match event {
            MediaEvent::TimeUpdate(seconds) => {
                if seconds.is_finite() && seconds >= 0.0 {
                    self.set_position(seconds);
                }
            }
            MediaEvent::LoadedMetadata { duration } => self.on_loaded_metadata(duration),
            MediaEvent::Ended => self.on_ended(tracks),
            MediaEvent::PlayRejected { reason } => self.reject(reason),
        }
    }

    /// Rebind if the current track's resolved source differs from the bound one
    ///
    /// Call after anything that may change the current track's source, such
    /// as rehydration.
    pub fn sync(&mut self, tracks: &[Track]) {
        self.bind(tracks, false);
    }

    /// Renumber after the track at `removed_index` was removed
    ///
    /// `tracks` is the playlist after removal.
    pub fn track_removed(&mut self, tracks: &[Track], removed_index: usize) {
        let current = self.status.current_index;

        if removed_index == current {
            if tracks.is_empty() {
                self.status.is_playing = false;
            }
            self.status.current_index = removed_index.min(tracks.len().saturating_sub(1));
            self.emit_track_changed(tracks);
            self.bind(tracks, true);
        } else if removed_index < current {
            self.status.current_index = current - 1;
            self.emit_track_changed(tracks);
        }
    }

    /// Stop and detach the media element
    pub fn shutdown(&mut self) {
        self.media.pause();
        self.media.set_src(None);
        self.bound_source = None;
        self.source_ready = false;
        self.status.is_playing = false;
        self.status.state = PlaybackState::Idle;
        self.emit(PlayerEvent::SourceChanged { src: None });
        self.report_state();
    }

    // ===== Internals =====

    /// Point the media element at the current track's source
    ///
    /// Skipped when the source is unchanged, unless forced.
    fn bind(&mut self, tracks: &[Track], force: bool) {
        self.clamp_index(tracks.len());

        let src = tracks
            .get(self.status.current_index)
            .and_then(Track::resolved_source)
            .map(str::to_string);

        if !force && src == self.bound_source {
            return;
        }

        self.media.pause();
        self.media.set_src(src.as_deref());
        self.media.load();

        self.bound_source.clone_from(&src);
        self.source_ready = false;
        self.set_position(0.0);
        if self.status.duration.take().is_some() {
            self.emit(PlayerEvent::DurationChanged { duration: None });
        }
        debug!(src = ?src, "Bound media source");
        self.emit(PlayerEvent::SourceChanged { src: src.clone() });

        if src.is_some() {
            self.status.state = PlaybackState::Loading;
            self.report_state();
            if self.status.is_playing {
                self.start_playback();
            }
        } else {
            self.status.is_playing = false;
            self.status.state = PlaybackState::Idle;
            self.report_state();
        }
    }

    fn start_playback(&mut self) {
        if self.bound_source.is_none() {
            self.status.is_playing = false;
            self.status.state = PlaybackState::Idle;
            self.report_state();
            return;
        }

        match self.media.play() {
            Ok(()) => {
                self.status.state = PlaybackState::Playing;
                self.report_state();
            }
            Err(e) => self.reject(e.to_string()),
        }
    }

    fn restart(&mut self) {
        self.media.set_current_time(0.0);
        self.set_position(0.0);
        self.start_playback();
    }

    /// Media refused to play: fall back to paused
    fn reject(&mut self, reason: String) {
        warn!(reason = %reason, "Playback rejected by media element");

        self.status.is_playing = false;
        self.status.state = if self.bound_source.is_some() {
            PlaybackState::Paused
        } else {
            PlaybackState::Idle
        };
        self.report_state();
        self.emit(PlayerEvent::Warning(PlaybackError::PlaybackRejected(reason)));
    }

    fn on_loaded_metadata(&mut self, duration: f64) {
        let Some(src) = self.bound_source.clone() else {
            return;
        };

        let duration = (duration.is_finite() && duration > 0.0).then_some(duration);
        if self.status.duration != duration {
            self.status.duration = duration;
            self.emit(PlayerEvent::DurationChanged { duration });
        }

        if !self.source_ready {
            self.source_ready = true;
            self.emit(PlayerEvent::SourceReady { src });
        }

        if self.status.state == PlaybackState::Loading {
            self.status.state = if self.status.is_playing {
                PlaybackState::Playing
            } else {
                PlaybackState::Paused
            };
            self.report_state();
        }
    }

    fn on_ended(&mut self, tracks: &[Track]) {
        self.status.state = PlaybackState::Ended;
        self.report_state();

        if self.status.loop_enabled {
            self.status.is_playing = true;
            self.restart();
        } else {
            self.next(tracks);
        }
    }

    fn apply_volume(&mut self) {
        let level = self.volume.level();
        let muted = self.volume.is_muted();
        self.media.set_volume(level);

        if self.status.volume != level || self.status.muted != muted {
            self.status.volume = level;
            self.status.muted = muted;
            self.emit(PlayerEvent::VolumeChanged {
                volume: level,
                muted,
            });
        }
    }

    fn set_position(&mut self, seconds: f64) {
        if self.status.position != seconds {
            self.status.position = seconds;
            self.emit(PlayerEvent::PositionChanged { position: seconds });
        }
    }

    fn clamp_index(&mut self, len: usize) {
        if self.status.current_index >= len {
            self.status.current_index = len.saturating_sub(1);
        }
    }

    fn emit_track_changed(&mut self, tracks: &[Track]) {
        let index = self.status.current_index;
        let track_id = tracks.get(index).map(|track| track.id.clone());
        self.emit(PlayerEvent::TrackChanged { index, track_id });
    }

    /// Emit `StateChanged` if state or intent differ from the last report
    fn report_state(&mut self) {
        let current = (self.status.state, self.status.is_playing);
        if current != self.last_reported {
            self.last_reported = current;
            self.emit(PlayerEvent::StateChanged {
                state: current.0,
                is_playing: current.1,
            });
        }
    }
}

impl<M: MediaElement + std::fmt::Debug> std::fmt::Debug for PlaybackController<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("media", &self.media)
            .field("status", &self.status)
            .field("bound_source", &self.bound_source)
            .field("source_ready", &self.source_ready)
            .finish_non_exhaustive()
    }
}
