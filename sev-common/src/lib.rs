//! # Severance Common Library
//!
//! Shared code for the Severance promo front-end crates:
//! - Event types (PromoEvent enum) and the injected EventBus
//! - Configuration loading (TOML bootstrap + built-in defaults)
//! - Opacity fade curves
//! - Time helpers for second-based media timing

pub mod config;
pub mod error;
pub mod events;
pub mod fade_curves;
pub mod time;

pub use error::{Error, Result};
pub use fade_curves::FadeCurve;
