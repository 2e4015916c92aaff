//! Accent theme derived from the current track

use crate::types::DEFAULT_ACCENT;
use cadence_core::{AccentColor, Track};

/// Percentage the secondary color is lightened by
pub const SECONDARY_SHADE_PERCENT: f64 = 20.0;

/// Two-color theme for the player chrome and the visualizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// The track's accent color
    pub primary: AccentColor,
    /// `primary` lightened by 20%
    pub secondary: AccentColor,
}

impl Theme {
    /// Theme built around `primary`
    pub fn from_primary(primary: AccentColor) -> Self {
        Self {
            primary,
            secondary: shade_color(primary, SECONDARY_SHADE_PERCENT),
        }
    }
}

/// Theme for `track`, or the default accent when there is none
pub fn derive_theme(track: Option<&Track>) -> Theme {
    Theme::from_primary(track.map_or(DEFAULT_ACCENT, |track| track.color))
}

/// Scale every channel by `1 + percent / 100`, saturating at 255
pub fn shade_color(color: AccentColor, percent: f64) -> AccentColor {
    color.shade(percent)
}
