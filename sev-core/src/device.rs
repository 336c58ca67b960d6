//! Device-class detection
//!
//! The promo only runs on desktops. Classification combines user-agent
//! patterns with a small-screen plus touch heuristic, then applies two
//! overrides: iPhone/iPod is always a phone, and Android is a phone when the
//! agent says "mobile" and a tablet otherwise.
//!
//! Hosts re-probe on resize and orientation change.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};

/// Screens at or below this size on either axis count as small
pub const SMALL_SCREEN_PX: u32 = 768;

static MOBILE_UA: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"(?i)android|webos|iphone|ipod|blackberry|iemobile|opera mini|mobile").ok()
});

static TABLET_UA: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)ipad|android.*tablet|tablet|kindle|silk|playbook").ok());

static HANDHELD_APPLE_UA: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?i)iphone|ipod").ok());

static ANDROID_UA: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?i)android").ok());

static MOBILE_KEYWORD: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?i)mobile").ok());

fn is_match(pattern: &Lazy<Option<Regex>>, haystack: &str) -> bool {
    pattern.as_ref().is_some_and(|re| re.is_match(haystack))
}

/// Raw environment readings taken by the host
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceProbe {
    pub user_agent: String,
    pub screen_width: u32,
    pub screen_height: u32,
    pub window_width: u32,
    pub window_height: u32,
    /// Touch events or touch points available
    pub touch: bool,
}

impl DeviceProbe {
    pub fn is_small_screen(&self) -> bool {
        self.screen_width.min(self.screen_height) <= SMALL_SCREEN_PX
            || self.window_width.min(self.window_height) <= SMALL_SCREEN_PX
    }
}

/// Device classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub is_mobile: bool,
    pub is_tablet: bool,
    pub is_desktop: bool,
    /// Lower-cased user agent the classification was made from
    pub user_agent: String,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            is_mobile: false,
            is_tablet: false,
            is_desktop: true,
            user_agent: String::new(),
        }
    }
}

impl DeviceInfo {
    pub fn detect(probe: &DeviceProbe) -> Self {
        let user_agent = probe.user_agent.to_lowercase();
        let mobile_ua = is_match(&MOBILE_UA, &user_agent);
        let tablet_ua = is_match(&TABLET_UA, &user_agent);

        let (mut is_mobile, mut is_tablet) = if mobile_ua && !tablet_ua {
            (true, false)
        } else if tablet_ua {
            (false, true)
        } else if probe.is_small_screen() && probe.touch {
            (true, false)
        } else {
            (false, false)
        };

        if is_match(&HANDHELD_APPLE_UA, &user_agent) {
            is_mobile = true;
            is_tablet = false;
        }
        if is_match(&ANDROID_UA, &user_agent) {
            let phone = is_match(&MOBILE_KEYWORD, &user_agent);
            is_mobile = phone;
            is_tablet = !phone;
        }

        Self {
            is_mobile,
            is_tablet,
            is_desktop: !is_mobile && !is_tablet,
            user_agent,
        }
    }

    /// Only desktops get the app; everything else sees the unsupported screen
    pub fn is_supported(&self) -> bool {
        self.is_desktop && !self.is_mobile && !self.is_tablet
    }
}

/// Keeps the current classification and recomputes it on demand
#[derive(Debug, Clone, Default)]
pub struct DeviceDetector {
    info: DeviceInfo,
}

impl DeviceDetector {
    pub fn new(probe: &DeviceProbe) -> Self {
        let info = DeviceInfo::detect(probe);
        info!(
            mobile = info.is_mobile,
            tablet = info.is_tablet,
            desktop = info.is_desktop,
            "Device detected"
        );
        Self { info }
    }

    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    /// Resize or orientation change; returns true when the class changed
    pub fn on_resize(&mut self, probe: &DeviceProbe) -> bool {
        let info = DeviceInfo::detect(probe);
        let changed = info != self.info;
        if changed {
            debug!(
                mobile = info.is_mobile,
                tablet = info.is_tablet,
                desktop = info.is_desktop,
                "Device class changed"
            );
        }
        self.info = info;
        changed
    }
}
