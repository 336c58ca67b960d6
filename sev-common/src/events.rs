//! Event types and the cross-view event bus
//!
//! Views never reach for a global to announce that the intro started or the
//! story ended. Each emitter and listener is handed an [`EventBus`] at
//! construction, which keeps lifetimes and ordering testable in isolation.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Promo front-end event types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PromoEvent {
    /// The cinematic intro was started by the user
    ///
    /// Ambient footer audio pauses on this signal.
    GameStarted {
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The story sequence finished and control returned to the main view
    ///
    /// Ambient footer audio resumes on this signal.
    GameEnded {
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// One manifest entry settled (success or failure)
    PreloadProgress {
        loaded: usize,
        total: usize,
        percent: u8,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Every manifest entry settled
    PreloadCompleted {
        total: usize,
        error_count: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A loop engine started a crossfade from one surface to the other
    LoopTransition {
        source: String,
        from: BufferSlot,
        to: BufferSlot,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The one-shot intro finished (naturally or skipped)
    IntroCompleted {
        skipped: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The scrolling story finished (naturally, by fallback timer, or skipped)
    StoryCompleted {
        skipped: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl PromoEvent {
    /// Get event type as string for filtering
    pub fn event_type(&self) -> &str {
        match self {
            PromoEvent::GameStarted { .. } => "GameStarted",
            PromoEvent::GameEnded { .. } => "GameEnded",
            PromoEvent::PreloadProgress { .. } => "PreloadProgress",
            PromoEvent::PreloadCompleted { .. } => "PreloadCompleted",
            PromoEvent::LoopTransition { .. } => "LoopTransition",
            PromoEvent::IntroCompleted { .. } => "IntroCompleted",
            PromoEvent::StoryCompleted { .. } => "StoryCompleted",
        }
    }

    pub fn game_started() -> Self {
        PromoEvent::GameStarted {
            timestamp: crate::time::now(),
        }
    }

    pub fn game_ended() -> Self {
        PromoEvent::GameEnded {
            timestamp: crate::time::now(),
        }
    }
}

// ========================================
// Supporting Enums
// ========================================

/// One of the two playback surfaces a loop engine alternates between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BufferSlot {
    A,
    B,
}

impl BufferSlot {
    /// The other surface
    pub fn other(self) -> Self {
        match self {
            BufferSlot::A => BufferSlot::B,
            BufferSlot::B => BufferSlot::A,
        }
    }
}

impl std::fmt::Display for BufferSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferSlot::A => write!(f, "A"),
            BufferSlot::B => write!(f, "B"),
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Injected publish/subscribe channel shared by emitting and listening views
///
/// The EventBus uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
///
/// # Examples
///
/// ```
/// use sev_common::events::{EventBus, PromoEvent};
///
/// let bus = EventBus::new(16);
/// let mut rx = bus.subscribe();
///
/// bus.emit_lossy(PromoEvent::game_started());
/// assert_eq!(rx.try_recv().unwrap().event_type(), "GameStarted");
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PromoEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// Events beyond `capacity` that a subscriber has not yet received are
    /// dropped for that subscriber (it observes `Lagged`).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<PromoEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: PromoEvent,
    ) -> Result<usize, broadcast::error::SendError<PromoEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: PromoEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
