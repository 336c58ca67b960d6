//! Autoplay deferral state machine
//!
//! Runtimes may refuse to start audio that the user did not ask for. When
//! that happens playback is deferred to the next user gesture instead of
//! failing the sequence it belongs to.
//!
//! ```text
//!                 attempt() ok
//! NotStarted ─────────────────────────────→ Playing
//!     │ attempt() blocked / defer()            ↑
//!     ↓                                        │ on_user_gesture() ok
//! AwaitingUserGesture ─────────────────────────┘
//!     │ on_user_gesture() fails / abandon()
//!     ↓
//! NotStarted
//! ```
//!
//! Each external input has exactly one edge; an input arriving in a state
//! without an edge for it is ignored.

use crate::error::MediaError;
use crate::playback::media::{halt, SharedMedia};
use tracing::{debug, error, warn};

/// Autoplay lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoplayState {
    NotStarted,
    AwaitingUserGesture,
    Playing,
}

/// Drives one media element through the autoplay state machine
pub struct AutoplayGate {
    label: &'static str,
    media: SharedMedia,
    state: AutoplayState,
}

impl AutoplayGate {
    pub fn new(label: &'static str, media: SharedMedia) -> Self {
        Self {
            label,
            media,
            state: AutoplayState::NotStarted,
        }
    }

    pub fn state(&self) -> AutoplayState {
        self.state
    }

    pub fn media(&self) -> &SharedMedia {
        &self.media
    }

    /// Unsolicited start attempt
    pub fn attempt(&mut self) -> AutoplayState {
        if self.state != AutoplayState::NotStarted {
            return self.state;
        }
        self.state = match self.media.play() {
            Ok(()) => {
                debug!(media = self.label, "Autoplay started");
                AutoplayState::Playing
            }
            Err(MediaError::PlaybackBlocked) => {
                warn!(media = self.label, "Autoplay blocked, waiting for user interaction");
                AutoplayState::AwaitingUserGesture
            }
            Err(e) => {
                error!(media = self.label, error = %e, "Autoplay failed");
                AutoplayState::NotStarted
            }
        };
        self.state
    }

    /// Skip the unsolicited attempt and wait for the first gesture
    pub fn defer(&mut self) -> AutoplayState {
        if self.state == AutoplayState::NotStarted {
            self.state = AutoplayState::AwaitingUserGesture;
        }
        self.state
    }

    /// A user gesture arrived; retry once if we were waiting for one
    pub fn on_user_gesture(&mut self) -> AutoplayState {
        if self.state != AutoplayState::AwaitingUserGesture {
            return self.state;
        }
        self.state = match self.media.play() {
            Ok(()) => {
                debug!(media = self.label, "Playback started after user interaction");
                AutoplayState::Playing
            }
            Err(e) => {
                error!(media = self.label, error = %e, "Playback failed after user interaction");
                AutoplayState::NotStarted
            }
        };
        self.state
    }

    /// Stop waiting for a gesture without attempting playback
    pub fn abandon(&mut self) -> AutoplayState {
        if self.state == AutoplayState::AwaitingUserGesture {
            debug!(media = self.label, "Deferred playback abandoned");
            self.state = AutoplayState::NotStarted;
        }
        self.state
    }

    /// Halt and rewind; any pending deferral is dropped
    pub fn stop(&mut self) {
        halt(self.media.as_ref());
        self.state = AutoplayState::NotStarted;
    }
}
