//! In-memory media element
//!
//! Records every call the core makes so tests can assert on playback state
//! without a host runtime.

use std::sync::{Arc, Mutex};

use sev_core::error::MediaError;
use sev_core::playback::MediaElement;

#[derive(Debug)]
struct Inner {
    duration: Option<f64>,
    position: f64,
    paused: bool,
    opacity: f64,
    volume: f64,
    play_calls: u32,
    seeks: Vec<f64>,
    blocked_plays: u32,
}

/// Fake media element
#[derive(Debug)]
pub struct FakeMedia {
    inner: Mutex<Inner>,
}

impl FakeMedia {
    /// Paused element with unknown duration
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Inner {
                duration: None,
                position: 0.0,
                paused: true,
                opacity: 0.0,
                volume: 1.0,
                play_calls: 0,
                seeks: Vec::new(),
                blocked_plays: 0,
            }),
        })
    }

    /// Element with metadata loaded
    pub fn with_duration(duration: f64) -> Arc<Self> {
        let media = Self::new();
        media.set_duration(Some(duration));
        media
    }

    pub fn set_duration(&self, duration: Option<f64>) {
        self.inner.lock().unwrap().duration = duration;
    }

    /// Simulate playback reaching a position
    pub fn set_position(&self, position: f64) {
        self.inner.lock().unwrap().position = position;
    }

    /// Refuse the next `count` play() calls as autoplay-blocked
    pub fn block_next_plays(&self, count: u32) {
        self.inner.lock().unwrap().blocked_plays = count;
    }

    pub fn play_calls(&self) -> u32 {
        self.inner.lock().unwrap().play_calls
    }

    pub fn seeks(&self) -> Vec<f64> {
        self.inner.lock().unwrap().seeks.clone()
    }

    pub fn opacity(&self) -> f64 {
        self.inner.lock().unwrap().opacity
    }

    pub fn volume(&self) -> f64 {
        self.inner.lock().unwrap().volume
    }

    pub fn position(&self) -> f64 {
        self.inner.lock().unwrap().position
    }
}

impl MediaElement for FakeMedia {
    fn duration(&self) -> Option<f64> {
        self.inner.lock().unwrap().duration
    }

    fn current_time(&self) -> f64 {
        self.inner.lock().unwrap().position
    }

    fn seek(&self, position: f64) {
        let mut inner = self.inner.lock().unwrap();
        inner.position = position;
        inner.seeks.push(position);
    }

    fn play(&self) -> Result<(), MediaError> {
        let mut inner = self.inner.lock().unwrap();
        inner.play_calls += 1;
        if inner.blocked_plays > 0 {
            inner.blocked_plays -= 1;
            return Err(MediaError::PlaybackBlocked);
        }
        inner.paused = false;
        Ok(())
    }

    fn pause(&self) {
        self.inner.lock().unwrap().paused = true;
    }

    fn set_opacity(&self, opacity: f64) {
        self.inner.lock().unwrap().opacity = opacity;
    }

    fn set_volume(&self, volume: f64) {
        self.inner.lock().unwrap().volume = volume;
    }

    fn is_paused(&self) -> bool {
        self.inner.lock().unwrap().paused
    }
}
