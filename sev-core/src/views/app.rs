//! Top-level screen router
//!
//! ```text
//! non-desktop device ───────────────→ Unsupported
//! desktop, license not accepted ────→ Loading (preloader running)
//! desktop, license accepted ────────→ Main
//! ```
//!
//! The device check wins over everything else and is re-evaluated on every
//! resize, so a desktop window shrunk to phone size drops to Unsupported and
//! comes back to where it was.

use crate::device::{DeviceDetector, DeviceInfo, DeviceProbe};
use crate::error::Result;
use crate::preload::{AssetFetcher, AssetManifest, PreloadState, Preloader};
use crate::views::gate::LicenseGate;
use serde::Serialize;
use sev_common::config::AppConfig;
use sev_common::events::EventBus;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Unsupported,
    Loading,
    Main,
}

pub struct App {
    device: DeviceDetector,
    preloader: Arc<Preloader>,
    gate: LicenseGate,
    preload_task: Option<JoinHandle<()>>,
}

impl App {
    /// Build the shell and start preloading if the device is supported
    ///
    /// Must be called from within a tokio runtime. A config that fails
    /// validation is refused before anything is fetched.
    pub fn mount(
        config: &AppConfig,
        probe: &DeviceProbe,
        fetcher: Arc<dyn AssetFetcher>,
        events: EventBus,
    ) -> Result<Self> {
        config.validate()?;

        let manifest = AssetManifest::from(&config.preload);
        let preloader = Arc::new(Preloader::new(manifest, fetcher, Some(events)));
        let gate = LicenseGate::new(preloader.subscribe());

        let mut app = Self {
            device: DeviceDetector::new(probe),
            preloader,
            gate,
            preload_task: None,
        };
        app.sync_preloading();
        info!(screen = ?app.screen(), "App mounted");
        Ok(app)
    }

    pub fn screen(&self) -> Screen {
        if !self.device.info().is_supported() {
            Screen::Unsupported
        } else if !self.gate.is_accepted() {
            Screen::Loading
        } else {
            Screen::Main
        }
    }

    pub fn device(&self) -> &DeviceInfo {
        self.device.info()
    }

    pub fn preloader(&self) -> &Arc<Preloader> {
        &self.preloader
    }

    pub fn gate(&self) -> &LicenseGate {
        &self.gate
    }

    /// "I Accept" on the loading screen
    pub fn accept(&mut self) -> Result<Screen> {
        self.gate.accept()?;
        Ok(self.screen())
    }

    /// Resolve once the license can be accepted
    pub async fn wait_ready(&mut self) -> PreloadState {
        self.gate.wait_ready().await
    }

    /// Resize or orientation change
    pub fn on_device_change(&mut self, probe: &DeviceProbe) -> Screen {
        if self.device.on_resize(probe) {
            self.sync_preloading();
            debug!(screen = ?self.screen(), "Screen re-evaluated");
        }
        self.screen()
    }

    /// The loading screen owns the preloader; start it when it first shows
    fn sync_preloading(&mut self) {
        if self.preload_task.is_some() || self.screen() != Screen::Loading {
            return;
        }
        let preloader = Arc::clone(&self.preloader);
        self.preload_task = Some(tokio::spawn(async move {
            preloader.start().await;
        }));
    }

    pub fn unmount(&mut self) {
        if let Some(task) = self.preload_task.take() {
            task.abort();
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.unmount();
    }
}
