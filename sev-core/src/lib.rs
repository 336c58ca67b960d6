//! # Severance Promo Core (sev-core)
//!
//! Media sequencing core for the Severance promo site.
//!
//! **Purpose:** Preload the site's media, gate entry behind the license
//! screen, keep the background video looping without a visible seam, and
//! sequence the intro, scrolling story and footer music around user input.
//!
//! **Architecture:** Event-driven on tokio. The host owns the actual media
//! elements and forwards their events (time updates, end of playback, user
//! input) into the state machines here; components coordinate through the
//! [`sev_common::events::EventBus`].

pub mod device;
pub mod error;
pub mod input;
pub mod playback;
pub mod preload;
pub mod views;
pub mod wallet;

pub use error::{Error, Result};
