//! Media element boundary
//!
//! The controller never decodes audio. It drives a single media element the
//! host provides (an `<audio>` tag in the browser) and reacts to the events
//! that element reports back.

use thiserror::Error;

/// Reasons a media element refuses to play
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    /// Autoplay policy or similar refusal
    #[error("play not allowed: {0}")]
    NotAllowed(String),

    /// Nothing is bound to play
    #[error("no source bound")]
    NoSource,

    /// The source cannot be decoded
    #[error("unsupported source: {0}")]
    Unsupported(String),
}

/// Events a media element reports
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Playback position advanced (seconds)
    TimeUpdate(f64),

    /// Metadata of the bound source is available
    LoadedMetadata {
        /// Reported duration in seconds; may be NaN or infinite for streams
        duration: f64,
    },

    /// The bound source played to its end
    Ended,

    /// An earlier `play()` was rejected asynchronously
    PlayRejected {
        /// Why the element refused
        reason: String,
    },
}

/// A single audio output the controller can drive
pub trait MediaElement: Send {
    /// Start or resume playback of the bound source
    ///
    /// # Errors
    /// Returns `MediaError` when the element refuses synchronously.
    fn play(&mut self) -> Result<(), MediaError>;

    /// Pause playback
    fn pause(&mut self);

    /// (Re)load the bound source
    fn load(&mut self);

    /// Bind a source, or detach with `None`
    fn set_src(&mut self, src: Option<&str>);

    /// Currently bound source
    fn src(&self) -> Option<&str>;

    /// Move the playback position (seconds)
    fn set_current_time(&mut self, seconds: f64);

    /// Playback position (seconds)
    fn current_time(&self) -> f64;

    /// Set output volume in `[0, 1]`
    fn set_volume(&mut self, volume: f32);

    /// Output volume
    fn volume(&self) -> f32;

    /// Whether the element is paused
    fn is_paused(&self) -> bool;
}

/// Call recorded by `HeadlessMedia`
#[derive(Debug, Clone, PartialEq)]
pub enum MediaCall {
    Play,
    Pause,
    Load,
    SetSrc(Option<String>),
    SetCurrentTime(f64),
    SetVolume(f32),
}

/// Media element with no audio output
///
/// Tracks the state a real element would and records every call, for
/// headless hosts and tests.
#[derive(Debug, Clone)]
pub struct HeadlessMedia {
    src: Option<String>,
    current_time: f64,
    volume: f32,
    paused: bool,
    reject_play: Option<String>,
    calls: Vec<MediaCall>,
}

impl Default for HeadlessMedia {
    fn default() -> Self {
        Self {
            src: None,
            current_time: 0.0,
            volume: 1.0,
            paused: true,
            reject_play: None,
            calls: Vec::new(),
        }
    }
}

impl HeadlessMedia {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `play()` fail with `NotAllowed(reason)`,
    /// or succeed again with `None`
    pub fn reject_play(&mut self, reason: Option<&str>) {
        self.reject_play = reason.map(str::to_string);
    }

    /// Every call received so far
    pub fn calls(&self) -> &[MediaCall] {
        &self.calls
    }

    /// Drain the call log
    pub fn take_calls(&mut self) -> Vec<MediaCall> {
        std::mem::take(&mut self.calls)
    }
}

impl MediaElement for HeadlessMedia {
    fn play(&mut self) -> Result<(), MediaError> {
        self.calls.push(MediaCall::Play);
        if let Some(reason) = &self.reject_play {
            return Err(MediaError::NotAllowed(reason.clone()));
        }
        if self.src.is_none() {
            return Err(MediaError::NoSource);
        }
        self.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        self.calls.push(MediaCall::Pause);
        self.paused = true;
    }

    fn load(&mut self) {
        self.calls.push(MediaCall::Load);
        self.current_time = 0.0;
        self.paused = true;
    }

    fn set_src(&mut self, src: Option<&str>) {
        self.calls.push(MediaCall::SetSrc(src.map(str::to_string)));
        self.src = src.map(str::to_string);
    }

    fn src(&self) -> Option<&str> {
        self.src.as_deref()
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.calls.push(MediaCall::SetCurrentTime(seconds));
        self.current_time = seconds;
    }

    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn set_volume(&mut self, volume: f32) {
        self.calls.push(MediaCall::SetVolume(volume));
        self.volume = volume;
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn is_paused(&self) -> bool {
        self.paused
    }
}
