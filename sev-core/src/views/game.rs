//! Main game view
//!
//! Owns the ambient background loop for its whole lifetime and sequences
//! the "Start" flow on top of it:
//!
//! ```text
//! Idle ──start()──→ Intro ──ended / skip──→ Story ──complete──→ Idle
//!        GameStarted                                  GameEnded
//! ```

use crate::input::UserInput;
use crate::playback::autoplay::AutoplayState;
use crate::playback::intro::IntroSequence;
use crate::playback::loop_engine::{LoopConfig, LoopEngine, TimeAdvance};
use crate::playback::media::SharedMedia;
use crate::playback::story::{StoryMedia, StoryOutcome, StorySequence};
use sev_common::config::{AppConfig, IntroSettings, StorySettings};
use sev_common::events::{BufferSlot, EventBus, PromoEvent};
use tracing::{debug, info};

/// Every media element the game view drives
#[derive(Clone)]
pub struct GameMedia {
    pub ambient_a: SharedMedia,
    pub ambient_b: SharedMedia,
    pub intro: SharedMedia,
    pub narration: SharedMedia,
    pub story_a: SharedMedia,
    pub story_b: SharedMedia,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Start screen over the ambient loop
    Idle,
    Intro,
    Story,
}

pub struct GameView {
    ambient: LoopEngine,
    story_loop: LoopConfig,
    intro_settings: IntroSettings,
    story_settings: StorySettings,
    media: GameMedia,
    intro: Option<IntroSequence>,
    story: Option<StorySequence>,
    events: EventBus,
}

impl GameView {
    /// Mount the view and start the ambient loop
    pub async fn mount(config: &AppConfig, media: GameMedia, events: EventBus) -> Self {
        let ambient = LoopEngine::mount(
            LoopConfig::from(&config.ambient_loop),
            media.ambient_a.clone(),
            media.ambient_b.clone(),
            Some(events.clone()),
        )
        .await;

        Self {
            ambient,
            story_loop: LoopConfig::from(&config.story_loop),
            intro_settings: config.intro.clone(),
            story_settings: config.story.clone(),
            media,
            intro: None,
            story: None,
            events,
        }
    }

    pub fn phase(&self) -> GamePhase {
        if self.story.is_some() {
            GamePhase::Story
        } else if self.intro.is_some() {
            GamePhase::Intro
        } else {
            GamePhase::Idle
        }
    }

    pub fn ambient(&self) -> &LoopEngine {
        &self.ambient
    }

    pub fn intro(&self) -> Option<&IntroSequence> {
        self.intro.as_ref()
    }

    pub fn story(&self) -> Option<&StorySequence> {
        self.story.as_ref()
    }

    /// "Start" control: announce the game and play the intro
    ///
    /// Only honoured from the start screen.
    pub fn start(&mut self) -> bool {
        if self.phase() != GamePhase::Idle {
            debug!(phase = ?self.phase(), "Start ignored");
            return false;
        }

        info!("Game started");
        self.events.emit_lossy(PromoEvent::game_started());

        let mut intro = IntroSequence::new(
            &self.intro_settings,
            self.media.intro.clone(),
            self.events.clone(),
        );
        intro.start();
        self.intro = Some(intro);
        true
    }

    /// Document-level input
    pub async fn on_input(&mut self, input: &UserInput) -> GamePhase {
        match self.phase() {
            GamePhase::Intro => {
                let finished = self
                    .intro
                    .as_mut()
                    .and_then(|intro| intro.on_input(input))
                    .is_some();
                if finished {
                    self.begin_story().await;
                }
            }
            GamePhase::Story => {
                if let Some(story) = &self.story {
                    story.on_input(input).await;
                }
                self.poll().await;
            }
            GamePhase::Idle => {}
        }
        self.phase()
    }

    /// The intro video reported its natural end
    pub async fn on_intro_ended(&mut self) {
        let finished = self
            .intro
            .as_mut()
            .and_then(|intro| intro.on_ended())
            .is_some();
        if finished {
            self.begin_story().await;
        }
    }

    async fn begin_story(&mut self) {
        if let Some(mut intro) = self.intro.take() {
            intro.unmount();
        }
        let media = StoryMedia {
            narration: self.media.narration.clone(),
            background_a: self.media.story_a.clone(),
            background_b: self.media.story_b.clone(),
        };
        let story = StorySequence::mount(
            &self.story_settings,
            self.story_loop.clone(),
            media,
            self.events.clone(),
        )
        .await;
        self.story = Some(story);
    }

    pub async fn on_ambient_time_advance(&self, slot: BufferSlot) -> TimeAdvance {
        self.ambient.on_time_advance(slot).await
    }

    pub async fn on_story_time_advance(&self, slot: BufferSlot) -> TimeAdvance {
        match &self.story {
            Some(story) => story.on_background_time_advance(slot).await,
            None => TimeAdvance::Ignored,
        }
    }

    /// Narration buffered enough to play; `None` outside the story
    pub async fn on_narration_can_play(&self) -> Option<AutoplayState> {
        match &self.story {
            Some(story) => Some(story.on_narration_can_play().await),
            None => None,
        }
    }

    /// Per-frame housekeeping: drive the scroll and collect story completion
    ///
    /// Returns the outcome on the frame the story hands back to the start
    /// screen.
    pub async fn poll(&mut self) -> Option<StoryOutcome> {
        let story = self.story.as_mut()?;
        story.frame().await;
        let outcome = story.take_outcome()?;

        if let Some(mut story) = self.story.take() {
            story.unmount().await;
        }
        info!(end = ?outcome.end, "Game ended");
        self.events.emit_lossy(PromoEvent::game_ended());
        Some(outcome)
    }

    /// Whether the "Press SPACE to skip" hint is up
    pub async fn skip_visible(&self) -> bool {
        if let Some(intro) = &self.intro {
            return intro.skip_visible();
        }
        match &self.story {
            Some(story) => story.skip_visible().await,
            None => false,
        }
    }

    /// Tear down everything the view started
    pub async fn unmount(&mut self) {
        if let Some(mut intro) = self.intro.take() {
            intro.unmount();
        }
        if let Some(mut story) = self.story.take() {
            story.unmount().await;
        }
        self.ambient.unmount().await;
        debug!("Game view unmounted");
    }
}
