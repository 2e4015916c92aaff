//! Player events
//!
//! Observers subscribe once and are called synchronously, in subscription
//! order, every time the player state changes:
//! - State and intent changes (play/pause/loading/ended)
//! - Track and source changes
//! - Source readiness (once per bound source)
//! - Position, duration and volume updates
//! - Playlist changes and rehydration results
//! - Warnings for non-fatal failures

use crate::error::PlaybackError;
use crate::types::PlaybackState;
use cadence_core::TrackId;

/// Events emitted by the player
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// State machine state or play intent changed
    StateChanged {
        /// The new state
        state: PlaybackState,
        /// The new play intent
        is_playing: bool,
    },

    /// The selected track changed
    TrackChanged {
        /// New current index
        index: usize,
        /// Id of the new current track, `None` when the playlist is empty
        track_id: Option<TrackId>,
    },

    /// The media element was bound to a new source (or detached)
    SourceChanged {
        /// The bound source
        src: Option<String>,
    },

    /// The bound source reported metadata; analyzers may attach now
    SourceReady {
        /// The ready source
        src: String,
    },

    /// Position update
    PositionChanged {
        /// Elapsed seconds
        position: f64,
    },

    /// Duration of the bound source became known (or unknown)
    DurationChanged {
        /// Seconds, when finite and positive
        duration: Option<f64>,
    },

    /// Volume or mute changed
    VolumeChanged {
        /// Effective volume
        volume: f32,
        /// Whether output is muted
        muted: bool,
    },

    /// Shuffle toggled
    ShuffleChanged(bool),

    /// Loop toggled
    LoopChanged(bool),

    /// Tracks added or removed
    PlaylistChanged {
        /// New playlist length
        len: usize,
    },

    /// A stored track regained its live handle
    TrackRehydrated {
        /// The track
        track_id: TrackId,
    },

    /// Something failed without interrupting the session
    Warning(PlaybackError),
}

/// Handle returned by `EventBus::subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&PlayerEvent) + Send>;

/// Synchronous fan-out of `PlayerEvent`s
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<(SubscriptionId, Callback)>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for every future event
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&PlayerEvent) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Stop delivering events to `id`; returns whether it was subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    /// Deliver `event` to every subscriber
    pub fn emit(&mut self, event: &PlayerEvent) {
        for (_, callback) in &mut self.subscribers {
            callback(event);
        }
    }

    /// Number of active subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
