//! Visualizer boundary
//!
//! A frequency visualizer needs two things: read access to the media element
//! it analyzes and the colors to draw with. It sends nothing back.

use crate::media::MediaElement;
use crate::theme::Theme;

/// What a visualizer attaches to
///
/// Only handed out once the bound source has reported its metadata, so an
/// analyzer attaches exactly once per source.
#[derive(Clone, Copy)]
pub struct VisualizerFeed<'a> {
    media: &'a dyn MediaElement,
    theme: Theme,
}

impl<'a> VisualizerFeed<'a> {
    pub(crate) fn new(media: &'a dyn MediaElement, theme: Theme) -> Self {
        Self { media, theme }
    }

    /// The media element to analyze
    pub fn media(&self) -> &'a dyn MediaElement {
        self.media
    }

    /// Colors to draw with
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Source being analyzed
    pub fn src(&self) -> Option<&'a str> {
        self.media.src()
    }
}

impl std::fmt::Debug for VisualizerFeed<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisualizerFeed")
            .field("src", &self.media.src())
            .field("theme", &self.theme)
            .finish()
    }
}
