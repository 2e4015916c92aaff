//! Cadence - Playback Management
//!
//! The state machine behind the Cadence audio player.
//!
//! This crate provides:
//! - Playlist model with a durable safe snapshot (no live handles, no bytes)
//! - Local-file addition backed by an asset store, with rehydration on reload
//! - Live handle lifecycle (every handle released exactly once)
//! - Transport state machine (select, next/previous, seek, shuffle, loop)
//! - Volume with mute memory
//! - Event subscription instead of polling
//! - Theme derivation and the visualizer boundary
//!
//! # Architecture
//!
//! `cadence-playback` never touches audio samples or the DOM:
//! - Audio output is a `MediaElement` the host provides
//! - Persistence goes through the `AssetStore` and `SnapshotStore` traits
//!   from `cadence-core`
//! - Store and media failures degrade the session, they never abort it
//!
//! # Example
//!
//! ```rust,no_run
//! use cadence_core::{AssetStore, Blob, SnapshotStore};
//! use cadence_playback::{HeadlessMedia, MediaEvent, PlaybackConfig, Player};
//! use std::sync::Arc;
//!
//! # async fn example(
//! #     assets: Arc<dyn AssetStore>,
//! #     snapshots: Arc<dyn SnapshotStore>,
//! # ) -> cadence_playback::Result<()> {
//! let mut player = Player::open(HeadlessMedia::new(), assets, snapshots, PlaybackConfig::default()).await?;
//!
//! // Restore local files saved in earlier sessions
//! let report = player.rehydrate_all().await;
//! println!("restored {} local tracks", report.restored);
//!
//! // Add a file and start playing it
//! player.add_local(Blob::with_content_type(vec![0u8; 1024], "audio/mpeg"), "demo.mp3").await;
//! player.handle_media_event(MediaEvent::LoadedMetadata { duration: 183.0 });
//!
//! if let Some(feed) = player.visualizer_feed() {
//!     println!("visualize {:?} in {}", feed.src(), feed.theme().primary);
//! }
//!
//! player.shutdown();
//! # Ok(())
//! # }
//! ```

mod controller;
mod error;
mod events;
mod handles;
mod media;
mod player;
mod playlist;
mod shuffle;
pub mod snapshot;
mod theme;
pub mod types;
mod visualizer;
mod volume;

// Public exports
pub use controller::PlaybackController;
pub use error::{PlaybackError, Result};
pub use events::{EventBus, PlayerEvent, SubscriptionId};
pub use handles::{HandleRegistry, HandleStats};
pub use media::{HeadlessMedia, MediaCall, MediaElement, MediaError, MediaEvent};
pub use player::{Player, RehydrationReport};
pub use playlist::{
    title_from_file_name, PlaylistModel, Rehydrated, Rehydration, RehydrationOutcome,
    RemovedTrack,
};
pub use theme::{derive_theme, shade_color, Theme};
pub use types::{PlaybackConfig, PlaybackState, PlaybackStatus};
pub use visualizer::VisualizerFeed;
