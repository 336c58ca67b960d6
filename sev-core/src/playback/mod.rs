//! Media sequencing: loop engine, intro, story and footer music

pub mod autoplay;
pub mod buffer;
pub mod footer;
pub mod intro;
pub mod loop_engine;
pub mod media;
pub mod story;

pub use autoplay::{AutoplayGate, AutoplayState};
pub use footer::AmbientAudio;
pub use intro::{IntroOutcome, IntroPhase, IntroSequence};
pub use loop_engine::{LoopConfig, LoopEngine, TimeAdvance};
pub use media::{MediaElement, SharedMedia};
pub use story::{StoryEnd, StoryMedia, StoryOutcome, StorySequence};
