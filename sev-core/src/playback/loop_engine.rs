//! Seamless dual-buffer loop engine
//!
//! Looping a single media element shows a visible restart at the loop
//! boundary. The engine instead alternates between two surfaces playing the
//! same source: shortly before the active surface runs out, the idle one is
//! started from a small offset and the two swap opacity.
//!
//! # Transition Sequence
//!
//! ```text
//! time update on active surface
//!     ↓ remaining = duration - position
//! remaining <= threshold && !transition_in_flight
//!     ↓ latch transition_in_flight
//! incoming: seek(restart_offset), play(), fade → max_opacity
//! outgoing:                              fade → 0
//!     ↓ settle_delay
//! flip active designation, release latch
//! ```
//!
//! One parametrised engine drives both the full-opacity ambient background
//! and the dimmed story background.

use crate::playback::buffer::LoopBuffer;
use crate::playback::media::{halt, SharedMedia};
use sev_common::config::LoopSettings;
use sev_common::events::{BufferSlot, EventBus, PromoEvent};
use sev_common::time::{known_duration, seconds_to_duration};
use sev_common::FadeCurve;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Loop engine parameters
#[derive(Debug, Clone, PartialEq)]
pub struct LoopConfig {
    pub source: String,
    /// Remaining seconds on the active surface at which the crossfade starts
    pub threshold: f64,
    /// Delay before the incoming surface becomes the active one
    pub settle_delay: Duration,
    /// Seek position for the incoming surface, skipping a black first frame
    pub restart_offset: f64,
    /// Opacity of the visible surface
    pub max_opacity: f64,
    /// Opacity ramp duration; zero swaps instantly
    pub fade: Duration,
    pub fade_curve: FadeCurve,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self::from(&LoopSettings::default())
    }
}

impl From<&LoopSettings> for LoopConfig {
    fn from(settings: &LoopSettings) -> Self {
        Self {
            source: settings.source.clone(),
            threshold: settings.threshold_secs,
            settle_delay: seconds_to_duration(settings.settle_delay_secs),
            restart_offset: settings.restart_offset_secs,
            max_opacity: settings.max_opacity,
            fade: seconds_to_duration(settings.fade_secs),
            fade_curve: settings.fade_curve,
        }
    }
}

/// Outcome of a time update
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeAdvance {
    /// Update came from the idle surface or after unmount
    Ignored,
    /// Duration unknown (metadata not loaded); nothing was touched
    MetadataPending,
    /// Still playing comfortably before the threshold
    Playing { remaining: f64 },
    /// Inside the threshold but a transition is already running
    TransitionInFlight,
    /// This update started a transition
    TransitionStarted { from: BufferSlot, to: BufferSlot },
}

struct LoopState {
    a: LoopBuffer,
    b: LoopBuffer,
    active: BufferSlot,
    transition_in_flight: bool,
    transitions: u64,
    mounted: bool,
}

impl LoopState {
    fn buffer(&self, slot: BufferSlot) -> &LoopBuffer {
        match slot {
            BufferSlot::A => &self.a,
            BufferSlot::B => &self.b,
        }
    }

    fn buffer_mut(&mut self, slot: BufferSlot) -> &mut LoopBuffer {
        match slot {
            BufferSlot::A => &mut self.a,
            BufferSlot::B => &mut self.b,
        }
    }

    /// Settle-delay expiry: the incoming surface takes over
    fn finish_transition(&mut self, to: BufferSlot) {
        if !self.mounted || !self.transition_in_flight {
            return;
        }
        self.buffer_mut(to.other()).set_active(false);
        self.buffer_mut(to).set_active(true);
        self.active = to;
        self.transition_in_flight = false;
    }
}

/// Dual-buffer loop engine
///
/// Owns both surfaces for its lifetime. Dropping the engine without calling
/// [`LoopEngine::unmount`] aborts the pending settle timer but leaves the
/// media elements as they are.
pub struct LoopEngine {
    config: Arc<LoopConfig>,
    state: Arc<Mutex<LoopState>>,
    settle_task: Mutex<Option<JoinHandle<()>>>,
    events: Option<EventBus>,
}

impl LoopEngine {
    /// Mount the engine: surface A visible and playing, surface B hidden
    pub async fn mount(
        config: LoopConfig,
        a: SharedMedia,
        b: SharedMedia,
        events: Option<EventBus>,
    ) -> Self {
        let now = Instant::now();
        let state = LoopState {
            a: LoopBuffer::new(BufferSlot::A, a, config.max_opacity, true, now),
            b: LoopBuffer::new(BufferSlot::B, b, 0.0, false, now),
            active: BufferSlot::A,
            transition_in_flight: false,
            transitions: 0,
            mounted: true,
        };

        if let Err(e) = state.a.media().play() {
            // Muted background video; a refused start only delays the first frame
            warn!(source = %config.source, error = %e, "Loop surface A failed to start");
        }

        info!(
            source = %config.source,
            threshold = config.threshold,
            max_opacity = config.max_opacity,
            "Loop engine mounted"
        );

        Self {
            config: Arc::new(config),
            state: Arc::new(Mutex::new(state)),
            settle_task: Mutex::new(None),
            events,
        }
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Playback-position update from one of the surfaces
    ///
    /// Only updates from the active surface are considered. When the active
    /// surface's duration is not known yet the call is a silent no-op.
    pub async fn on_time_advance(&self, slot: BufferSlot) -> TimeAdvance {
        let mut state = self.state.lock().await;
        if !state.mounted || slot != state.active {
            return TimeAdvance::Ignored;
        }

        let outgoing = state.buffer(slot);
        let Some(duration) = known_duration(outgoing.media().duration()) else {
            return TimeAdvance::MetadataPending;
        };
        let remaining = duration - outgoing.media().current_time();

        if remaining > self.config.threshold {
            return TimeAdvance::Playing { remaining };
        }
        if state.transition_in_flight {
            return TimeAdvance::TransitionInFlight;
        }

        let from = slot;
        let to = slot.other();
        state.transition_in_flight = true;
        state.transitions += 1;

        let now = Instant::now();
        let config = &self.config;
        {
            let incoming = state.buffer_mut(to);
            incoming.media().seek(config.restart_offset);
            if let Err(e) = incoming.media().play() {
                warn!(source = %config.source, slot = %to, error = %e, "Incoming loop surface failed to start");
            }
            incoming.fade_to(config.max_opacity, now, config.fade, config.fade_curve);
        }
        state
            .buffer_mut(from)
            .fade_to(0.0, now, config.fade, config.fade_curve);
        drop(state);

        debug!(
            source = %config.source,
            %from,
            %to,
            remaining,
            "Loop crossfade started"
        );

        if let Some(events) = &self.events {
            events.emit_lossy(PromoEvent::LoopTransition {
                source: config.source.clone(),
                from,
                to,
                timestamp: sev_common::time::now(),
            });
        }

        self.schedule_settle(to).await;

        TimeAdvance::TransitionStarted { from, to }
    }

    async fn schedule_settle(&self, to: BufferSlot) {
        let state = Arc::clone(&self.state);
        let delay = self.config.settle_delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            state.lock().await.finish_transition(to);
        });

        // The latch guarantees the previous settle task already ran
        if let Some(previous) = self.settle_task.lock().await.replace(handle) {
            previous.abort();
        }
    }

    /// Push the current opacity of both surfaces to their media elements
    ///
    /// Hosts call this once per animation frame while a fade is running.
    pub async fn render(&self) -> (f64, f64) {
        let state = self.state.lock().await;
        let now = Instant::now();
        (state.a.render(now), state.b.render(now))
    }

    pub async fn active_slot(&self) -> BufferSlot {
        self.state.lock().await.active
    }

    pub async fn is_transitioning(&self) -> bool {
        self.state.lock().await.transition_in_flight
    }

    /// Rendered opacity of a surface right now
    pub async fn opacity(&self, slot: BufferSlot) -> f64 {
        self.state.lock().await.buffer(slot).opacity_at(Instant::now())
    }

    /// Opacity a surface is being driven toward
    pub async fn target_opacity(&self, slot: BufferSlot) -> f64 {
        self.state.lock().await.buffer(slot).target_opacity()
    }

    pub async fn is_buffer_active(&self, slot: BufferSlot) -> bool {
        self.state.lock().await.buffer(slot).is_active()
    }

    /// Number of transitions started since mount
    pub async fn transition_count(&self) -> u64 {
        self.state.lock().await.transitions
    }

    /// Detach and halt: abort the settle timer, pause and rewind both surfaces
    ///
    /// Later time updates are ignored. Calling this twice is harmless.
    pub async fn unmount(&self) {
        if let Some(handle) = self.settle_task.lock().await.take() {
            handle.abort();
        }

        let mut state = self.state.lock().await;
        if !state.mounted {
            return;
        }
        state.mounted = false;
        state.transition_in_flight = false;
        halt(state.a.media().as_ref());
        halt(state.b.media().as_ref());

        info!(source = %self.config.source, "Loop engine unmounted");
    }
}

impl Drop for LoopEngine {
    fn drop(&mut self) {
        if let Some(handle) = self.settle_task.get_mut().take() {
            handle.abort();
        }
    }
}
