//! Opacity fade curves for buffer crossfades
//!
//! A crossfade drives one playback surface toward its opacity ceiling while
//! the other is driven to zero. The curve decides how the value travels
//! between the two endpoints over the configured fade duration:
//!
//! - **Linear**: constant rate, `y = t`
//! - **EaseIn**: slow start, fast finish, `y = t²`
//! - **EaseOut**: fast start, slow finish, `y = 1 - (1-t)²`
//! - **EaseInOut**: smooth S-curve, `y = 0.5 × (1 - cos(π × t))`
//!
//! A zero fade duration bypasses the curve entirely (instantaneous swap).

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::str::FromStr;

/// Fade curve types for opacity transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeCurve {
    /// `y = t`
    Linear,

    /// `y = t²`
    #[serde(alias = "ease-in")]
    EaseIn,

    /// `y = 1 - (1-t)²`
    #[serde(alias = "ease-out")]
    EaseOut,

    /// `y = 0.5 × (1 - cos(π × t))`
    #[serde(alias = "ease-in-out", alias = "cosine")]
    EaseInOut,
}

impl FadeCurve {
    /// Progress multiplier (0.0 to 1.0) at a normalized position through the fade
    ///
    /// # Arguments
    /// * `position` - Normalized position through fade (clamped to 0.0..=1.0)
    pub fn progress(&self, position: f64) -> f64 {
        let t = if position.is_nan() { 0.0 } else { position.clamp(0.0, 1.0) };

        match self {
            FadeCurve::Linear => t,
            FadeCurve::EaseIn => t * t,
            FadeCurve::EaseOut => {
                let inv = 1.0 - t;
                1.0 - inv * inv
            }
            FadeCurve::EaseInOut => 0.5 * (1.0 - (PI * t).cos()),
        }
    }

    /// Interpolate an opacity value between `from` and `to`
    pub fn interpolate(&self, from: f64, to: f64, position: f64) -> f64 {
        from + (to - from) * self.progress(position)
    }

    /// Canonical config-file spelling
    pub fn as_config_str(&self) -> &'static str {
        match self {
            FadeCurve::Linear => "linear",
            FadeCurve::EaseIn => "ease_in",
            FadeCurve::EaseOut => "ease_out",
            FadeCurve::EaseInOut => "ease_in_out",
        }
    }

    /// Get all available fade curve variants
    pub fn all_variants() -> &'static [FadeCurve] {
        &[
            FadeCurve::Linear,
            FadeCurve::EaseIn,
            FadeCurve::EaseOut,
            FadeCurve::EaseInOut,
        ]
    }
}

impl Default for FadeCurve {
    /// Background surfaces have always faded with an ease-in-out transition
    fn default() -> Self {
        FadeCurve::EaseInOut
    }
}

impl FromStr for FadeCurve {
    type Err = crate::Error;

    /// Accepts the config spelling plus the CSS timing-function names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(FadeCurve::Linear),
            "ease_in" | "ease-in" => Ok(FadeCurve::EaseIn),
            "ease_out" | "ease-out" => Ok(FadeCurve::EaseOut),
            "ease_in_out" | "ease-in-out" | "cosine" => Ok(FadeCurve::EaseInOut),
            other => Err(crate::Error::InvalidInput(format!(
                "unknown fade curve '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for FadeCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_config_str())
    }
}
