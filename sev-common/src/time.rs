//! Timestamp and media-time utilities
//!
//! Media positions and durations are `f64` seconds (what a media element
//! reports); timers run on `std::time::Duration`. These helpers convert
//! between the two without ever producing a panic on NaN or negative input.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Convert media seconds to a timer duration
///
/// NaN, infinite and negative values collapse to `Duration::ZERO`.
pub fn seconds_to_duration(seconds: f64) -> Duration {
    if seconds.is_finite() && seconds > 0.0 {
        Duration::from_secs_f64(seconds)
    } else {
        Duration::ZERO
    }
}

/// Convert a timer duration to media seconds
pub fn duration_to_seconds(duration: Duration) -> f64 {
    duration.as_secs_f64()
}

/// Returns the media duration if the element has loaded enough metadata
/// to report one.
///
/// Media elements report NaN (or nothing) before metadata arrives, and
/// infinity for unbounded streams; neither can drive an end-of-track check.
pub fn known_duration(duration: Option<f64>) -> Option<f64> {
    duration.filter(|d| d.is_finite() && *d > 0.0)
}
