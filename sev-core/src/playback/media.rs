//! Media element handle
//!
//! The playback core never decodes anything itself. It drives handles to
//! media elements owned by the host (a `<video>`/`<audio>` element in the
//! browser, a fake in tests) through this trait.

use crate::error::MediaError;
use std::sync::Arc;

/// Handle to one host media element
///
/// Implementations must be cheap to call from timer tasks; every method is
/// synchronous and reports the element's state at the moment of the call.
pub trait MediaElement: Send + Sync {
    /// Total duration in seconds, `None` until metadata has loaded
    ///
    /// Hosts that mirror the DOM may return `Some(f64::NAN)`; callers go
    /// through [`sev_common::time::known_duration`] before using it.
    fn duration(&self) -> Option<f64>;

    /// Current playback position in seconds
    fn current_time(&self) -> f64;

    /// Seek to a position in seconds
    fn seek(&self, position: f64);

    /// Start or resume playback
    ///
    /// Returns [`MediaError::PlaybackBlocked`] when the runtime refuses an
    /// unsolicited start.
    fn play(&self) -> Result<(), MediaError>;

    fn pause(&self);

    /// Apply a rendered opacity (video surfaces only; audio ignores it)
    fn set_opacity(&self, _opacity: f64) {}

    /// Apply an output volume (0.0 to 1.0)
    fn set_volume(&self, _volume: f64) {}

    fn is_paused(&self) -> bool;
}

/// Shared media handle as passed between views
pub type SharedMedia = Arc<dyn MediaElement>;

/// Pause and rewind, the teardown every view runs on unmount
pub fn halt(media: &dyn MediaElement) {
    media.pause();
    media.seek(0.0);
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct Inner {
        duration: Option<f64>,
        position: f64,
        paused: bool,
        play_calls: u32,
        blocked_plays: u32,
    }

    /// In-memory media element for unit tests
    #[derive(Debug, Default)]
    pub(crate) struct FakeMedia {
        inner: Mutex<Inner>,
    }

    impl FakeMedia {
        pub(crate) fn shared() -> Arc<Self> {
            let media = Self::default();
            media.inner.lock().unwrap().paused = true;
            Arc::new(media)
        }

        /// Refuse the next `count` play() calls as autoplay-blocked
        pub(crate) fn block_next_plays(&self, count: u32) {
            self.inner.lock().unwrap().blocked_plays = count;
        }

        pub(crate) fn play_calls(&self) -> u32 {
            self.inner.lock().unwrap().play_calls
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
            self.inner.lock().unwrap().position = position;
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

        fn is_paused(&self) -> bool {
            self.inner.lock().unwrap().paused
        }
    }
}
