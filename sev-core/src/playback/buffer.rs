//! Loop buffers and their opacity ramps
//!
//! A loop engine owns exactly two [`LoopBuffer`]s. Each buffer wraps a media
//! handle plus a continuous opacity value. Opacity is a ramp rather than a
//! flag so the same state machine serves both the instantaneous swap
//! (zero fade duration) and the timed fade.

use crate::playback::media::SharedMedia;
use sev_common::events::BufferSlot;
use sev_common::FadeCurve;
use std::time::Duration;
use tokio::time::Instant;

/// Opacity travelling from one value to another over a fixed duration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpacityRamp {
    from: f64,
    to: f64,
    started: Instant,
    duration: Duration,
    curve: FadeCurve,
}

impl OpacityRamp {
    /// A ramp that is already at rest at `value`
    pub fn steady(value: f64, now: Instant) -> Self {
        Self {
            from: value,
            to: value,
            started: now,
            duration: Duration::ZERO,
            curve: FadeCurve::Linear,
        }
    }

    /// Sample the ramp at `now`
    pub fn sample(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return self.to;
        }
        let elapsed = now.saturating_duration_since(self.started);
        let position = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        self.curve.interpolate(self.from, self.to, position)
    }

    pub fn target(&self) -> f64 {
        self.to
    }

    pub fn is_settled(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= self.duration
    }
}

/// One playback surface of a loop engine
pub struct LoopBuffer {
    slot: BufferSlot,
    media: SharedMedia,
    ramp: OpacityRamp,
    /// Feeding the visible output (the surface whose time updates count)
    active: bool,
}

impl LoopBuffer {
    pub fn new(slot: BufferSlot, media: SharedMedia, opacity: f64, active: bool, now: Instant) -> Self {
        media.set_opacity(opacity);
        Self {
            slot,
            media,
            ramp: OpacityRamp::steady(opacity, now),
            active,
        }
    }

    pub fn slot(&self) -> BufferSlot {
        self.slot
    }

    pub fn media(&self) -> &SharedMedia {
        &self.media
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Rendered opacity at `now`
    pub fn opacity_at(&self, now: Instant) -> f64 {
        self.ramp.sample(now)
    }

    /// Opacity the buffer is being driven toward
    pub fn target_opacity(&self) -> f64 {
        self.ramp.target()
    }

    pub fn is_fading(&self, now: Instant) -> bool {
        !self.ramp.is_settled(now)
    }

    /// Start driving the opacity toward `target`
    ///
    /// The ramp starts from whatever is rendered right now, so a fade that
    /// interrupts another fade never jumps.
    pub(crate) fn fade_to(&mut self, target: f64, now: Instant, duration: Duration, curve: FadeCurve) {
        let from = self.opacity_at(now);
        self.ramp = OpacityRamp {
            from,
            to: target,
            started: now,
            duration,
            curve,
        };
        self.media.set_opacity(self.ramp.sample(now));
    }

    /// Push the sampled opacity to the media element
    pub(crate) fn render(&self, now: Instant) -> f64 {
        let opacity = self.opacity_at(now);
        self.media.set_opacity(opacity);
        opacity
    }
}

impl std::fmt::Debug for LoopBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopBuffer")
            .field("slot", &self.slot)
            .field("ramp", &self.ramp)
            .field("active", &self.active)
            .finish()
    }
}
