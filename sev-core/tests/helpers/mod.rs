//! Test helper modules for sev-core integration tests
//!
//! Provides reusable test infrastructure components:
//! - FakeMedia: in-memory media element with scriptable autoplay refusal
//! - ScriptedFetcher: asset fetcher with per-path delays, results and a call log
//! - FakeWallet: wallet provider with scripted responses
//! - AssetServer: local HTTP origin for the real fetcher

#![allow(dead_code)]

pub mod asset_server;
pub mod fake_media;
pub mod fake_wallet;
pub mod scripted_fetcher;

// Re-export commonly used types
pub use asset_server::AssetServer;
pub use fake_media::FakeMedia;
pub use fake_wallet::FakeWallet;
pub use scripted_fetcher::ScriptedFetcher;

use sev_common::events::PromoEvent;
use tokio::sync::broadcast;

/// Drain every event currently queued on a bus receiver
pub fn drain_events(rx: &mut broadcast::Receiver<PromoEvent>) -> Vec<PromoEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Event type names, in order, of the queued events
pub fn drain_event_types(rx: &mut broadcast::Receiver<PromoEvent>) -> Vec<String> {
    drain_events(rx)
        .iter()
        .map(|e| e.event_type().to_string())
        .collect()
}
