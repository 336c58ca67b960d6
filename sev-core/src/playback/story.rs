//! Scrolling story sequence
//!
//! A text block scrolls along one axis over a long fixed duration with an
//! opacity envelope (fade in over the first 10%, fade out over the last
//! 10%). A dimmed loop engine plays behind it and a narration track tries to
//! start on its own.
//!
//! # Completion
//!
//! The sequence completes exactly once, whichever comes first:
//! - the skip key (stops the animation driver first)
//! - the hard fallback timer, which guarantees the sequence cannot hang
//! - the animation reaching its end (only reachable when the fallback is
//!   configured longer than the scroll)

use crate::input::UserInput;
use crate::playback::autoplay::{AutoplayGate, AutoplayState};
use crate::playback::loop_engine::{LoopConfig, LoopEngine, TimeAdvance};
use crate::playback::media::SharedMedia;
use sev_common::config::StorySettings;
use sev_common::events::{BufferSlot, EventBus, PromoEvent};
use sev_common::time::seconds_to_duration;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info};

/// Relative progress points of the opacity envelope
pub const OPACITY_KEY_TIMES: [f64; 4] = [0.0, 0.1, 0.9, 1.0];

/// Opacity at each key time
pub const OPACITY_KEY_VALUES: [f64; 4] = [0.0, 1.0, 1.0, 0.0];

/// Opacity of the story text at a relative progress point
///
/// Linear between key points.
pub fn envelope_opacity(progress: f64) -> f64 {
    let p = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
    for i in 1..OPACITY_KEY_TIMES.len() {
        let (t0, t1) = (OPACITY_KEY_TIMES[i - 1], OPACITY_KEY_TIMES[i]);
        if p <= t1 {
            let (v0, v1) = (OPACITY_KEY_VALUES[i - 1], OPACITY_KEY_VALUES[i]);
            let span = t1 - t0;
            if span <= 0.0 {
                return v1;
            }
            return v0 + (v1 - v0) * (p - t0) / span;
        }
    }
    OPACITY_KEY_VALUES[OPACITY_KEY_VALUES.len() - 1]
}

/// One sampled frame of the scroll animation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollFrame {
    /// Fraction of the scroll travel covered (0.0 to 1.0)
    pub progress: f64,
    pub opacity: f64,
}

/// Linear single-axis scroll driver
#[derive(Debug, Clone, Copy)]
pub struct ScrollAnimation {
    duration: Duration,
    started: Instant,
    stopped_at: Option<Instant>,
}

impl ScrollAnimation {
    pub fn start(duration: Duration, now: Instant) -> Self {
        Self {
            duration,
            started: now,
            stopped_at: None,
        }
    }

    /// Freeze the animation where it is
    pub fn stop(&mut self, now: Instant) {
        if self.stopped_at.is_none() {
            self.stopped_at = Some(now);
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped_at.is_some()
    }

    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let until = self.stopped_at.unwrap_or(now);
        let elapsed = until.saturating_duration_since(self.started);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    pub fn frame(&self, now: Instant) -> ScrollFrame {
        let progress = self.progress(now);
        ScrollFrame {
            progress,
            opacity: envelope_opacity(progress),
        }
    }

    /// Reached the end on its own (a stopped animation never finishes)
    pub fn is_finished(&self, now: Instant) -> bool {
        !self.is_stopped() && self.progress(now) >= 1.0
    }
}

/// Why the story ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryEnd {
    AnimationFinished,
    FallbackTimer,
    Skipped,
}

/// Handed to the parent view exactly once when the story ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoryOutcome {
    pub end: StoryEnd,
}

impl StoryOutcome {
    pub fn skipped(&self) -> bool {
        self.end == StoryEnd::Skipped
    }
}

/// Media handles the story view drives
pub struct StoryMedia {
    pub narration: SharedMedia,
    pub background_a: SharedMedia,
    pub background_b: SharedMedia,
}

struct StoryState {
    animation: ScrollAnimation,
    narration: AutoplayGate,
    skip_visible: bool,
    outcome_tx: Option<oneshot::Sender<StoryOutcome>>,
    events: EventBus,
}

impl StoryState {
    fn is_completed(&self) -> bool {
        self.outcome_tx.is_none()
    }

    /// Returns true the first time only
    fn complete(&mut self, end: StoryEnd) -> bool {
        let Some(tx) = self.outcome_tx.take() else {
            debug!(?end, "Story completion ignored");
            return false;
        };

        self.skip_visible = false;
        self.narration.stop();

        let outcome = StoryOutcome { end };
        info!(?end, "Story completed");
        self.events.emit_lossy(PromoEvent::StoryCompleted {
            skipped: outcome.skipped(),
            timestamp: sev_common::time::now(),
        });
        // Receiver is owned by the sequence; if it is gone the view already unmounted
        let _ = tx.send(outcome);
        true
    }
}

/// Scrolling story view with its own background loop and narration
pub struct StorySequence {
    state: Arc<Mutex<StoryState>>,
    outcome_rx: oneshot::Receiver<StoryOutcome>,
    fallback_task: Option<JoinHandle<()>>,
    background: LoopEngine,
    narration_source: String,
}

impl StorySequence {
    /// Mount: start the scroll, the background loop and the fallback timer
    ///
    /// Narration waits for [`StorySequence::on_narration_can_play`].
    pub async fn mount(
        settings: &StorySettings,
        background: LoopConfig,
        media: StoryMedia,
        events: EventBus,
    ) -> Self {
        media.narration.set_volume(settings.narration_volume);

        let background = LoopEngine::mount(
            background,
            media.background_a,
            media.background_b,
            Some(events.clone()),
        )
        .await;

        let (outcome_tx, outcome_rx) = oneshot::channel();
        let state = Arc::new(Mutex::new(StoryState {
            animation: ScrollAnimation::start(seconds_to_duration(settings.scroll_secs), Instant::now()),
            narration: AutoplayGate::new("narration", media.narration),
            skip_visible: true,
            outcome_tx: Some(outcome_tx),
            events,
        }));

        let fallback = seconds_to_duration(settings.fallback_secs);
        let timer_state = Arc::clone(&state);
        let fallback_task = tokio::spawn(async move {
            tokio::time::sleep(fallback).await;
            timer_state.lock().await.complete(StoryEnd::FallbackTimer);
        });

        info!(
            scroll_secs = settings.scroll_secs,
            fallback_secs = settings.fallback_secs,
            narration = %settings.narration_source,
            "Story mounted"
        );

        Self {
            state,
            outcome_rx,
            fallback_task: Some(fallback_task),
            background,
            narration_source: settings.narration_source.clone(),
        }
    }

    /// Narration buffered enough to play; try an unsolicited start
    pub async fn on_narration_can_play(&self) -> AutoplayState {
        let mut state = self.state.lock().await;
        if state.is_completed() {
            return state.narration.state();
        }
        state.narration.attempt()
    }

    /// Narration failed to load; the story carries on silently
    pub async fn on_narration_error(&self, message: &str) {
        let state = self.state.lock().await;
        if !state.is_completed() {
            error!(source = %self.narration_source, error = message, "Narration failed to load");
        }
    }

    /// Document-level input while mounted
    ///
    /// Returns true when this input completed the story.
    pub async fn on_input(&self, input: &UserInput) -> bool {
        let mut state = self.state.lock().await;
        if input.is_skip() {
            state.animation.stop(Instant::now());
            return state.complete(StoryEnd::Skipped);
        }
        if input.is_gesture(false) {
            state.narration.on_user_gesture();
        }
        false
    }

    /// Time update from one of the background surfaces
    pub async fn on_background_time_advance(&self, slot: BufferSlot) -> TimeAdvance {
        self.background.on_time_advance(slot).await
    }

    /// Sample the animation and complete if it ran to its end
    pub async fn frame(&self) -> ScrollFrame {
        let mut state = self.state.lock().await;
        let now = Instant::now();
        if state.animation.is_finished(now) {
            state.complete(StoryEnd::AnimationFinished);
        }
        state.animation.frame(now)
    }

    /// Non-blocking check for the completion outcome
    pub fn take_outcome(&mut self) -> Option<StoryOutcome> {
        self.outcome_rx.try_recv().ok()
    }

    pub async fn skip_visible(&self) -> bool {
        self.state.lock().await.skip_visible
    }

    pub async fn narration_state(&self) -> AutoplayState {
        self.state.lock().await.narration.state()
    }

    pub async fn is_completed(&self) -> bool {
        self.state.lock().await.is_completed()
    }

    pub fn narration_source(&self) -> &str {
        &self.narration_source
    }

    pub fn background(&self) -> &LoopEngine {
        &self.background
    }

    /// Detach everything: fallback timer, narration, animation, background loop
    pub async fn unmount(&mut self) {
        if let Some(task) = self.fallback_task.take() {
            task.abort();
        }
        {
            let mut state = self.state.lock().await;
            state.animation.stop(Instant::now());
            state.narration.stop();
            state.skip_visible = false;
        }
        self.background.unmount().await;
        debug!("Story unmounted");
    }
}

impl Drop for StorySequence {
    fn drop(&mut self) {
        if let Some(task) = self.fallback_task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_key_points() {
        assert_eq!(envelope_opacity(0.0), 0.0);
        assert!((envelope_opacity(0.05) - 0.5).abs() < 1e-9);
        assert_eq!(envelope_opacity(0.1), 1.0);
        assert_eq!(envelope_opacity(0.5), 1.0);
        assert_eq!(envelope_opacity(0.9), 1.0);
        assert!((envelope_opacity(0.95) - 0.5).abs() < 1e-9);
        assert_eq!(envelope_opacity(1.0), 0.0);
    }

    #[test]
    fn test_envelope_clamps() {
        assert_eq!(envelope_opacity(-1.0), 0.0);
        assert_eq!(envelope_opacity(2.0), 0.0);
        assert_eq!(envelope_opacity(f64::NAN), 0.0);
    }

    #[test]
    fn test_scroll_progress_is_linear() {
        let now = Instant::now();
        let animation = ScrollAnimation::start(Duration::from_secs(80), now);
        assert_eq!(animation.progress(now), 0.0);
        assert!((animation.progress(now + Duration::from_secs(40)) - 0.5).abs() < 1e-9);
        assert_eq!(animation.progress(now + Duration::from_secs(200)), 1.0);
        assert!(animation.is_finished(now + Duration::from_secs(80)));
    }

    #[test]
    fn test_stopped_animation_freezes() {
        let now = Instant::now();
        let mut animation = ScrollAnimation::start(Duration::from_secs(80), now);
        animation.stop(now + Duration::from_secs(8));
        let frame = animation.frame(now + Duration::from_secs(60));
        assert!((frame.progress - 0.1).abs() < 1e-9);
        assert!(!animation.is_finished(now + Duration::from_secs(100)));
    }
}
