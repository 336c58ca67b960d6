//! Sequential asset preloader
//!
//! Entries are fetched strictly one after another: entry N+1 is not
//! requested until entry N has settled. This bounds concurrent bandwidth
//! while the loading screen is up.
//!
//! Failed entries are recorded and counted as settled, so the gate always
//! opens once the walk ends. There are no retries.

use crate::preload::fetcher::AssetFetcher;
use crate::preload::manifest::AssetManifest;
use crate::preload::state::PreloadState;
use sev_common::events::{EventBus, PromoEvent};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

/// Walks an asset manifest once and publishes progress
pub struct Preloader {
    manifest: AssetManifest,
    fetcher: Arc<dyn AssetFetcher>,
    has_started: AtomicBool,
    /// URLs confirmed loaded by this instance
    loaded: Mutex<HashSet<String>>,
    state_tx: watch::Sender<PreloadState>,
    events: Option<EventBus>,
}

impl Preloader {
    pub fn new(
        manifest: AssetManifest,
        fetcher: Arc<dyn AssetFetcher>,
        events: Option<EventBus>,
    ) -> Self {
        let (state_tx, _) = watch::channel(PreloadState::new(manifest.len()));
        Self {
            manifest,
            fetcher,
            has_started: AtomicBool::new(false),
            loaded: Mutex::new(HashSet::new()),
            state_tx,
            events,
        }
    }

    pub fn manifest(&self) -> &AssetManifest {
        &self.manifest
    }

    /// Current progress snapshot
    pub fn state(&self) -> PreloadState {
        self.state_tx.borrow().clone()
    }

    /// Receiver that observes every progress update
    pub fn subscribe(&self) -> watch::Receiver<PreloadState> {
        self.state_tx.subscribe()
    }

    pub fn has_started(&self) -> bool {
        self.has_started.load(Ordering::SeqCst)
    }

    pub async fn is_cached(&self, url: &str) -> bool {
        self.loaded.lock().await.contains(url)
    }

    /// Walk the manifest
    ///
    /// Only the first call does any work; every later call (including one
    /// racing the first) returns `false` immediately. Callers that need the
    /// final state should use [`Preloader::wait_until_complete`].
    pub async fn start(&self) -> bool {
        if self.has_started.swap(true, Ordering::SeqCst) {
            debug!("Preloader already started, ignoring");
            return false;
        }

        info!(total = self.manifest.len(), "Preloading assets");

        for url in self.manifest.iter() {
            let already_loaded = self.loaded.lock().await.contains(url);
            if already_loaded {
                debug!(%url, "Asset already loaded, skipping duplicate fetch");
                self.state_tx.send_modify(|s| s.record_success());
            } else {
                match self.fetcher.fetch(url).await {
                    Ok(bytes) => {
                        debug!(%url, bytes, "Asset preloaded");
                        self.loaded.lock().await.insert(url.to_string());
                        self.state_tx.send_modify(|s| s.record_success());
                    }
                    Err(e) => {
                        let message = format!("Failed to load {}: {}", url, e);
                        warn!("{}", message);
                        self.state_tx.send_modify(|s| s.record_failure(message));
                    }
                }
            }
            self.publish_progress();
        }

        let state = self.state();
        info!(
            loaded = state.loaded_count,
            errors = state.error_count(),
            "Preloading complete"
        );
        if let Some(events) = &self.events {
            events.emit_lossy(PromoEvent::PreloadCompleted {
                total: state.total_count,
                error_count: state.error_count(),
                timestamp: sev_common::time::now(),
            });
        }
        true
    }

    /// Resolve once every entry has settled
    pub async fn wait_until_complete(&self) -> PreloadState {
        let mut rx = self.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait
        let settled = match rx.wait_for(|s| s.is_complete).await {
            Ok(state) => Some(state.clone()),
            Err(_) => None,
        };
        settled.unwrap_or_else(|| self.state())
    }

    fn publish_progress(&self) {
        let state = self.state_tx.borrow();
        debug!(
            loaded = state.loaded_count,
            total = state.total_count,
            percent = state.progress_percent,
            "Preload progress"
        );
        if let Some(events) = &self.events {
            events.emit_lossy(PromoEvent::PreloadProgress {
                loaded: state.loaded_count,
                total: state.total_count,
                percent: state.progress_percent,
                timestamp: sev_common::time::now(),
            });
        }
    }
}
