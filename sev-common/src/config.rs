//! Configuration loading and config-file resolution
//!
//! Bootstrap configuration is a single TOML file. Every key is optional and
//! falls back to a built-in default, so a missing file means "run with the
//! shipped constants".
//!
//! # Config File Resolution
//!
//! Priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Platform config directory (`<config_dir>/severance/config.toml`)
//! 4. Built-in defaults (no file)

use crate::{Error, FadeCurve, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable consulted when no CLI path is given
pub const CONFIG_ENV_VAR: &str = "SEVERANCE_CONFIG";

/// Top-level bootstrap configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub preload: PreloadSettings,
    #[serde(deserialize_with = "ambient_loop_overrides")]
    pub ambient_loop: LoopSettings,
    #[serde(deserialize_with = "story_loop_overrides")]
    pub story_loop: LoopSettings,
    pub intro: IntroSettings,
    pub story: StorySettings,
    pub footer: FooterSettings,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            preload: PreloadSettings::default(),
            ambient_loop: LoopSettings::default(),
            story_loop: LoopSettings::story_default(),
            intro: IntroSettings::default(),
            story: StorySettings::default(),
            footer: FooterSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Asset manifest and origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreloadSettings {
    /// Origin the manifest paths are resolved against
    pub base_url: String,
    /// Ordered asset paths; fetched strictly in this order
    pub manifest: Vec<String>,
}

impl Default for PreloadSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/".to_string(),
            manifest: vec![
                "/fon.mp4".to_string(),
                "/fon2.mp4".to_string(),
                "/intro.mp4".to_string(),
                "/intro.mp3".to_string(),
                "/sound.mp3".to_string(),
            ],
        }
    }
}

/// Parameters of one dual-buffer loop engine instance
///
/// All times are media seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoopSettings {
    pub source: String,
    /// Remaining playback time at which the crossfade starts
    pub threshold_secs: f64,
    /// Delay between starting the crossfade and flipping the active surface
    pub settle_delay_secs: f64,
    /// Seek offset for the incoming surface (skips a black first frame)
    pub restart_offset_secs: f64,
    /// Opacity of the visible surface
    pub max_opacity: f64,
    /// Duration of the opacity ramp; 0 swaps instantly
    pub fade_secs: f64,
    pub fade_curve: FadeCurve,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            source: "/fon.mp4".to_string(),
            threshold_secs: 2.0,
            settle_delay_secs: 0.5,
            restart_offset_secs: 0.1,
            max_opacity: 1.0,
            fade_secs: 2.0,
            fade_curve: FadeCurve::EaseInOut,
        }
    }
}

impl LoopSettings {
    /// Story background: same timing, dimmed to 30%
    pub fn story_default() -> Self {
        Self {
            source: "/fon2.mp4".to_string(),
            max_opacity: 0.3,
            ..Self::default()
        }
    }

    /// Reject settings that would make the engine misbehave
    pub fn validate(&self) -> Result<()> {
        if !(self.threshold_secs.is_finite() && self.threshold_secs > 0.0) {
            return Err(Error::Config(format!(
                "threshold_secs must be > 0, got {}",
                self.threshold_secs
            )));
        }
        if !(self.settle_delay_secs.is_finite() && self.settle_delay_secs >= 0.0) {
            return Err(Error::Config(format!(
                "settle_delay_secs must be >= 0, got {}",
                self.settle_delay_secs
            )));
        }
        if !(self.restart_offset_secs.is_finite() && self.restart_offset_secs >= 0.0) {
            return Err(Error::Config(format!(
                "restart_offset_secs must be >= 0, got {}",
                self.restart_offset_secs
            )));
        }
        if !(0.0..=1.0).contains(&self.max_opacity) {
            return Err(Error::Config(format!(
                "max_opacity must be within 0..=1, got {}",
                self.max_opacity
            )));
        }
        if !(self.fade_secs.is_finite() && self.fade_secs >= 0.0) {
            return Err(Error::Config(format!(
                "fade_secs must be >= 0, got {}",
                self.fade_secs
            )));
        }
        if self.source.trim().is_empty() {
            return Err(Error::Config("loop source must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Keys present in a `[*_loop]` table; absent keys keep the instance's own defaults
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LoopOverrides {
    source: Option<String>,
    threshold_secs: Option<f64>,
    settle_delay_secs: Option<f64>,
    restart_offset_secs: Option<f64>,
    max_opacity: Option<f64>,
    fade_secs: Option<f64>,
    fade_curve: Option<FadeCurve>,
}

impl LoopOverrides {
    fn apply(self, base: LoopSettings) -> LoopSettings {
        LoopSettings {
            source: self.source.unwrap_or(base.source),
            threshold_secs: self.threshold_secs.unwrap_or(base.threshold_secs),
            settle_delay_secs: self.settle_delay_secs.unwrap_or(base.settle_delay_secs),
            restart_offset_secs: self.restart_offset_secs.unwrap_or(base.restart_offset_secs),
            max_opacity: self.max_opacity.unwrap_or(base.max_opacity),
            fade_secs: self.fade_secs.unwrap_or(base.fade_secs),
            fade_curve: self.fade_curve.unwrap_or(base.fade_curve),
        }
    }
}

fn ambient_loop_overrides<'de, D>(deserializer: D) -> std::result::Result<LoopSettings, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(LoopOverrides::deserialize(deserializer)?.apply(LoopSettings::default()))
}

fn story_loop_overrides<'de, D>(deserializer: D) -> std::result::Result<LoopSettings, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(LoopOverrides::deserialize(deserializer)?.apply(LoopSettings::story_default()))
}

/// One-shot intro video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntroSettings {
    pub source: String,
}

impl Default for IntroSettings {
    fn default() -> Self {
        Self {
            source: "/intro.mp4".to_string(),
        }
    }
}

/// Scrolling story sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorySettings {
    /// Length of the scroll animation
    pub scroll_secs: f64,
    /// Hard timer forcing completion if the animation driver stalls
    pub fallback_secs: f64,
    pub narration_source: String,
    pub narration_volume: f64,
}

impl Default for StorySettings {
    fn default() -> Self {
        Self {
            scroll_secs: 80.0,
            fallback_secs: 75.0,
            narration_source: "/intro.mp3".to_string(),
            narration_volume: 0.7,
        }
    }
}

/// Ambient footer music
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FooterSettings {
    pub source: String,
    pub volume: f64,
}

impl Default for FooterSettings {
    fn default() -> Self {
        Self {
            source: "/sound.mp3".to_string(),
            volume: 0.3,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Parse a TOML document; absent keys take built-in defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Resolve a config path and load it, or fall back to built-in defaults
    pub fn resolve(cli_arg: Option<&Path>) -> Result<Self> {
        match resolve_config_path(cli_arg, CONFIG_ENV_VAR) {
            Some(path) => Self::load(&path),
            None => {
                debug!("No config file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.ambient_loop.validate()?;
        self.story_loop.validate()?;

        let story = &self.story;
        if !(story.scroll_secs.is_finite() && story.scroll_secs > 0.0) {
            return Err(Error::Config(format!(
                "story.scroll_secs must be > 0, got {}",
                story.scroll_secs
            )));
        }
        if !(story.fallback_secs.is_finite() && story.fallback_secs > 0.0) {
            return Err(Error::Config(format!(
                "story.fallback_secs must be > 0, got {}",
                story.fallback_secs
            )));
        }
        for (name, volume) in [
            ("story.narration_volume", story.narration_volume),
            ("footer.volume", self.footer.volume),
        ] {
            if !(0.0..=1.0).contains(&volume) {
                return Err(Error::Config(format!(
                    "{} must be within 0..=1, got {}",
                    name, volume
                )));
            }
        }
        Ok(())
    }
}

/// Config file resolution following the priority order in the module docs
///
/// Returns `None` when no source names an existing file.
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    default_config_path().filter(|p| p.exists())
}

/// `<config_dir>/severance/config.toml` for the current platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("severance").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_defaults_match_shipped_constants() {
        let config = AppConfig::default();
        assert_eq!(config.preload.manifest.len(), 5);
        assert_eq!(config.ambient_loop.threshold_secs, 2.0);
        assert_eq!(config.ambient_loop.settle_delay_secs, 0.5);
        assert_eq!(config.ambient_loop.restart_offset_secs, 0.1);
        assert_eq!(config.ambient_loop.max_opacity, 1.0);
        assert_eq!(config.story.scroll_secs, 80.0);
        assert_eq!(config.story.fallback_secs, 75.0);
        assert_eq!(config.footer.volume, 0.3);
        config.validate().unwrap();
    }

    #[test]
    fn test_story_loop_default_is_dimmed() {
        // Default derive must not hand out the ambient settings for the story surface
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.story_loop.source, "/fon2.mp4");
        assert_eq!(config.story_loop.max_opacity, 0.3);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [preload]
            base_url = "https://promo.example/"

            [ambient_loop]
            fade_secs = 0.0
            fade_curve = "linear"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.preload.base_url, "https://promo.example/");
        assert_eq!(config.preload.manifest.len(), 5);
        assert_eq!(config.ambient_loop.fade_secs, 0.0);
        assert_eq!(config.ambient_loop.fade_curve, FadeCurve::Linear);
        assert_eq!(config.ambient_loop.threshold_secs, 2.0);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_partial_story_loop_keeps_story_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [story_loop]
            fade_secs = 1.0
            "#,
        )
        .unwrap();
        assert_eq!(config.story_loop.fade_secs, 1.0);
        assert_eq!(config.story_loop.source, "/fon2.mp4");
        assert_eq!(config.story_loop.max_opacity, 0.3);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let err = AppConfig::from_toml_str(
            r#"
            [ambient_loop]
            threshold_secs = 0.0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_invalid_opacity_rejected() {
        let err = AppConfig::from_toml_str(
            r#"
            [story_loop]
            max_opacity = 1.5
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("max_opacity"));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = AppConfig::from_toml_str("[preload\nbase_url = ").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[footer]\nvolume = 0.5").unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.footer.volume, 0.5);
    }

    #[test]
    #[serial]
    fn test_cli_arg_beats_env_var() {
        std::env::set_var("SEV_TEST_CONFIG_A", "/from/env.toml");
        let path = resolve_config_path(Some(Path::new("/from/cli.toml")), "SEV_TEST_CONFIG_A");
        assert_eq!(path, Some(PathBuf::from("/from/cli.toml")));
        std::env::remove_var("SEV_TEST_CONFIG_A");
    }

    #[test]
    #[serial]
    fn test_env_var_used_without_cli_arg() {
        std::env::set_var("SEV_TEST_CONFIG_B", "/from/env.toml");
        let path = resolve_config_path(None, "SEV_TEST_CONFIG_B");
        assert_eq!(path, Some(PathBuf::from("/from/env.toml")));
        std::env::remove_var("SEV_TEST_CONFIG_B");
    }
}
