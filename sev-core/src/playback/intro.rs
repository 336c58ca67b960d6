//! One-shot cinematic intro
//!
//! Plays once, never loops. While it plays a skip hint is shown and the skip
//! key halts playback and takes the same completion path as the natural end
//! of the video. Completion fires at most once per mount.

use crate::input::UserInput;
use crate::playback::media::{halt, SharedMedia};
use sev_common::config::IntroSettings;
use sev_common::events::{EventBus, PromoEvent};
use tracing::{debug, info, warn};

/// Intro lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntroPhase {
    Ready,
    Playing,
    Completed,
}

/// Handed to the parent view exactly once when the intro ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntroOutcome {
    pub skipped: bool,
}

pub struct IntroSequence {
    source: String,
    media: SharedMedia,
    phase: IntroPhase,
    events: EventBus,
}

impl IntroSequence {
    pub fn new(settings: &IntroSettings, media: SharedMedia, events: EventBus) -> Self {
        Self {
            source: settings.source.clone(),
            media,
            phase: IntroPhase::Ready,
            events,
        }
    }

    /// Video the host loaded into the intro element
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn phase(&self) -> IntroPhase {
        self.phase
    }

    /// Skip hint is visible only while the intro plays
    pub fn skip_visible(&self) -> bool {
        self.phase == IntroPhase::Playing
    }

    /// Begin playback from the top
    ///
    /// Started by a click, so a refused start is unexpected; the skip key
    /// still works if it happens.
    pub fn start(&mut self) {
        if self.phase != IntroPhase::Ready {
            return;
        }
        self.phase = IntroPhase::Playing;
        self.media.seek(0.0);
        if let Err(e) = self.media.play() {
            warn!(source = %self.source, error = %e, "Intro video failed to start");
        }
        info!(source = %self.source, "Intro started");
    }

    /// Document-level input while mounted
    pub fn on_input(&mut self, input: &UserInput) -> Option<IntroOutcome> {
        if self.phase == IntroPhase::Playing && input.is_skip() {
            self.media.pause();
            return self.complete(true);
        }
        None
    }

    /// The media element reported end of playback
    pub fn on_ended(&mut self) -> Option<IntroOutcome> {
        self.complete(false)
    }

    /// Completion path shared by skip and natural end
    ///
    /// Returns the outcome the first time only.
    pub fn complete(&mut self, skipped: bool) -> Option<IntroOutcome> {
        if self.phase != IntroPhase::Playing {
            debug!(phase = ?self.phase, "Intro completion ignored");
            return None;
        }
        self.phase = IntroPhase::Completed;
        info!(skipped, "Intro completed");
        self.events.emit_lossy(PromoEvent::IntroCompleted {
            skipped,
            timestamp: sev_common::time::now(),
        });
        Some(IntroOutcome { skipped })
    }

    /// Detach: halt and rewind the video
    pub fn unmount(&mut self) {
        halt(self.media.as_ref());
        if self.phase == IntroPhase::Playing {
            self.phase = IntroPhase::Completed;
        }
    }
}
