//! Volume control with mute memory
//!
//! Volume is linear in `[0, 1]`, the range the media element takes. Muting
//! remembers the level it replaced so unmute can bring it back.

/// Volume controller
#[derive(Debug, Clone)]
pub struct Volume {
    /// Effective level (0 while muted)
    level: f32,

    /// Mute state
    muted: bool,

    /// Level unmute returns to
    restore: f32,

    /// Fallback when the remembered level is 0
    min_unmute: f32,
}

impl Volume {
    /// Create new volume controller
    ///
    /// # Arguments
    /// * `level` - Initial volume, clamped to `[0, 1]`
    /// * `min_unmute` - Level unmute uses when nothing louder was remembered
    pub fn new(level: f32, min_unmute: f32) -> Self {
        let level = clamp_unit(level).unwrap_or(0.0);
        Self {
            level,
            muted: level == 0.0,
            restore: level,
            min_unmute,
        }
    }

    /// Set volume level
    ///
    /// 0 mutes; anything above 0 unmutes and becomes the level unmute
    /// returns to. NaN is ignored. Returns whether anything changed.
    pub fn set_level(&mut self, level: f32) -> bool {
        let Some(level) = clamp_unit(level) else {
            return false;
        };

        let changed = level != self.level || self.muted != (level == 0.0);
        self.level = level;
        self.muted = level == 0.0;
        if level > 0.0 {
            self.restore = level;
        }
        changed
    }

    /// Toggle mute state
    pub fn toggle_mute(&mut self) {
        if self.muted {
            self.level = if self.restore > 0.0 {
                self.restore
            } else {
                self.min_unmute
            };
            self.muted = false;
        } else {
            self.restore = self.level;
            self.level = 0.0;
            self.muted = true;
        }
    }

    /// Current effective level
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }
}

fn clamp_unit(level: f32) -> Option<f32> {
    if level.is_nan() {
        None
    } else {
        Some(level.clamp(0.0, 1.0))
    }
}
