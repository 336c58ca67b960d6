//! View-level state machines composed from the playback and preload layers

pub mod app;
pub mod game;
pub mod gate;

pub use app::{App, Screen};
pub use game::{GameMedia, GamePhase, GameView};
pub use gate::LicenseGate;
