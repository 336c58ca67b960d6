//! Ambient footer music
//!
//! Looping background track with a play/pause toggle and a volume control.
//! It never starts on its own: the first document-level interaction starts
//! it, except a click on the "Start" control, which gives up on autostart so
//! the music does not fight the intro. While a game sequence runs the music
//! pauses and it resumes when the sequence ends.

use crate::input::UserInput;
use crate::playback::autoplay::{AutoplayGate, AutoplayState};
use crate::playback::media::SharedMedia;
use sev_common::config::FooterSettings;
use sev_common::events::{EventBus, PromoEvent};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub struct AmbientAudio {
    source: String,
    gate: AutoplayGate,
    playing: bool,
    volume: f64,
}

impl AmbientAudio {
    /// Mount with the configured volume, waiting for the first interaction
    pub fn mount(settings: &FooterSettings, media: SharedMedia) -> Self {
        let volume = settings.volume.clamp(0.0, 1.0);
        media.set_volume(volume);
        let mut gate = AutoplayGate::new("footer", media);
        gate.defer();
        debug!(source = %settings.source, volume, "Footer music mounted");
        Self {
            source: settings.source.clone(),
            gate,
            playing: false,
            volume,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Still waiting for the first interaction
    pub fn awaiting_first_interaction(&self) -> bool {
        self.gate.state() == AutoplayState::AwaitingUserGesture
    }

    /// First-interaction autostart; later inputs are ignored
    pub fn on_input(&mut self, input: &UserInput) {
        if !self.awaiting_first_interaction() || !input.is_gesture(true) {
            return;
        }
        if input.is_start_button_click() {
            self.gate.abandon();
            debug!("Start control clicked, footer autostart abandoned");
            return;
        }
        if self.gate.on_user_gesture() == AutoplayState::Playing {
            self.playing = true;
            info!(source = %self.source, "Footer music started");
        }
    }

    /// Play/pause control
    pub fn toggle(&mut self) -> bool {
        // An explicit toggle settles the first-interaction question too
        self.gate.abandon();

        let media = self.gate.media();
        if self.playing {
            media.pause();
            self.playing = false;
        } else {
            match media.play() {
                Ok(()) => self.playing = true,
                Err(e) => {
                    warn!(error = %e, "Footer music failed to start");
                    self.playing = false;
                }
            }
        }
        self.playing
    }

    /// Volume control (clamped to 0.0 to 1.0)
    pub fn set_volume(&mut self, volume: f64) {
        let volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
        self.volume = volume;
        self.gate.media().set_volume(volume);
    }

    /// The track reached its end
    pub fn on_ended(&mut self) {
        self.playing = false;
    }

    /// React to game lifecycle signals; other events are ignored
    pub fn handle_event(&mut self, event: &PromoEvent) {
        match event {
            PromoEvent::GameStarted { .. } => {
                if self.playing {
                    self.gate.media().pause();
                    self.playing = false;
                    debug!("Footer music paused for game");
                }
            }
            PromoEvent::GameEnded { .. } => {
                if !self.playing {
                    match self.gate.media().play() {
                        Ok(()) => {
                            self.playing = true;
                            debug!("Footer music resumed after game");
                        }
                        Err(e) => debug!(error = %e, "Footer music resume refused"),
                    }
                }
            }
            _ => {}
        }
    }
}

/// Forward bus events to the footer until the bus closes
pub fn spawn_listener(footer: Arc<Mutex<AmbientAudio>>, bus: &EventBus) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => footer.lock().await.handle_event(&event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Footer listener lagged behind event bus");
                }
                Err(RecvError::Closed) => break,
            }
        }
        debug!("Footer listener stopped");
    })
}
