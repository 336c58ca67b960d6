//! License gate shown on the loading screen
//!
//! "I Accept" is refused until the preloader reports every asset settled.

use crate::error::{Error, Result};
use crate::preload::PreloadState;
use tokio::sync::watch;
use tracing::{debug, info};

pub struct LicenseGate {
    progress: watch::Receiver<PreloadState>,
    accepted: bool,
}

impl LicenseGate {
    pub fn new(progress: watch::Receiver<PreloadState>) -> Self {
        Self {
            progress,
            accepted: false,
        }
    }

    /// Latest progress snapshot for the loading bar
    pub fn progress(&self) -> PreloadState {
        self.progress.borrow().clone()
    }

    pub fn can_accept(&self) -> bool {
        self.progress.borrow().is_complete
    }

    pub fn is_accepted(&self) -> bool {
        self.accepted
    }

    /// Accept the license; refused while assets are still loading
    pub fn accept(&mut self) -> Result<()> {
        let state = self.progress.borrow().clone();
        if !state.is_complete {
            debug!(percent = state.progress_percent, "Accept refused, still loading");
            return Err(Error::NotReady {
                percent: state.progress_percent,
            });
        }
        if !self.accepted {
            self.accepted = true;
            info!(errors = state.error_count(), "License accepted");
        }
        Ok(())
    }

    /// Wait until accepting becomes possible
    pub async fn wait_ready(&mut self) -> PreloadState {
        let settled = match self.progress.wait_for(|s| s.is_complete).await {
            Ok(state) => Some(state.clone()),
            Err(_) => None,
        };
        settled.unwrap_or_else(|| self.progress())
    }
}
