//! Core types for playback management

use crate::error::{PlaybackError, Result};
use cadence_core::AccentColor;
use serde::{Deserialize, Serialize};

/// Accent color used when a track has none (and for the empty-playlist theme)
pub const DEFAULT_ACCENT: AccentColor = AccentColor::from_rgb(0x63, 0x66, 0xf1);

/// Accent color given to locally added files
pub const LOCAL_ACCENT: AccentColor = AccentColor::from_rgb(0xf9, 0x73, 0x16);

/// Playback state of the current track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// No source bound
    Idle,

    /// Source bound, waiting for metadata or for play to start
    Loading,

    /// Currently playing
    Playing,

    /// Paused mid-track
    Paused,

    /// Reached the end of the current track
    Ended,
}

/// Snapshot of the controller's observable state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackStatus {
    /// Index of the selected track; always valid when the playlist is non-empty
    pub current_index: usize,

    /// Current state machine state
    pub state: PlaybackState,

    /// Playback intent: whether the user wants audio playing
    pub is_playing: bool,

    /// Elapsed position in seconds
    pub position: f64,

    /// Duration of the bound source in seconds, once known
    pub duration: Option<f64>,

    /// Volume in `[0, 1]`
    pub volume: f32,

    /// Whether output is muted
    pub muted: bool,

    /// Random next-track selection
    pub shuffle: bool,

    /// Repeat the current track when it ends
    pub loop_enabled: bool,
}

/// Configuration for the playback core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Volume at session start (default: 0.9)
    pub initial_volume: f32,

    /// Volume restored by unmute when the remembered volume is 0 (default: 0.1)
    pub min_unmute_volume: f32,

    /// `previous()` restarts the track instead when past this many seconds
    /// (default: 5.0)
    pub restart_threshold_secs: f64,

    /// Fallback accent color (default: #6366f1)
    pub default_color: AccentColor,

    /// Accent color for locally added files (default: #f97316)
    pub local_color: AccentColor,

    /// Artist shown for locally added files (default: "Local")
    pub local_artist: String,

    /// Name of the durable playlist document (default: "music_playlist")
    pub snapshot_name: String,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            initial_volume: 0.9,
            min_unmute_volume: 0.1,
            restart_threshold_secs: 5.0,
            default_color: DEFAULT_ACCENT,
            local_color: LOCAL_ACCENT,
            local_artist: "Local".to_string(),
            snapshot_name: "music_playlist".to_string(),
        }
    }
}

impl PlaybackConfig {
    /// Check that every value is in range
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.initial_volume) {
            return Err(PlaybackError::InvalidConfig(format!(
                "initial_volume must be within [0, 1], got {}",
                self.initial_volume
            )));
        }

        let min = self.min_unmute_volume;
        if min.is_nan() || min <= 0.0 || min > 1.0 {
            return Err(PlaybackError::InvalidConfig(format!(
                "min_unmute_volume must be within (0, 1], got {}",
                self.min_unmute_volume
            )));
        }

        if !self.restart_threshold_secs.is_finite() || self.restart_threshold_secs < 0.0 {
            return Err(PlaybackError::InvalidConfig(format!(
                "restart_threshold_secs must be a non-negative number, got {}",
                self.restart_threshold_secs
            )));
        }

        if self.snapshot_name.trim().is_empty() {
            return Err(PlaybackError::InvalidConfig(
                "snapshot_name must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = PlaybackConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_color.to_string(), "#6366f1");
        assert_eq!(config.local_color.to_string(), "#f97316");
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let config = PlaybackConfig {
            initial_volume: 1.5,
            ..PlaybackConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PlaybackError::InvalidConfig(_))
        ));

        let config = PlaybackConfig {
            min_unmute_volume: 0.0,
            ..PlaybackConfig::default()
        };
        assert!(config.validate().is_err());

        let config = PlaybackConfig {
            restart_threshold_secs: f64::NAN,
            ..PlaybackConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: PlaybackConfig =
            serde_json::from_str(r##"{"initial_volume": 0.5, "local_color": "#112233"}"##).unwrap();
        assert_eq!(config.initial_volume, 0.5);
        assert_eq!(config.local_color.to_string(), "#112233");
        assert_eq!(config.snapshot_name, "music_playlist");
    }
}
