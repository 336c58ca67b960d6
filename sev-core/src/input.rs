//! User input forwarded by the host
//!
//! Views only care about a handful of document-level inputs: the skip key
//! and "any gesture" for unlocking audio.

/// Key code that skips the intro and the story
pub const SKIP_KEY: &str = "Space";

/// A document-level input event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInput {
    /// Key press, carrying the DOM `KeyboardEvent.code`
    KeyDown { code: String },
    /// Pointer click; `on_start_button` marks clicks on the "Start" control
    Click { on_start_button: bool },
    TouchStart,
}

impl UserInput {
    pub fn key(code: impl Into<String>) -> Self {
        UserInput::KeyDown { code: code.into() }
    }

    pub fn space() -> Self {
        Self::key(SKIP_KEY)
    }

    pub fn click() -> Self {
        UserInput::Click {
            on_start_button: false,
        }
    }

    /// The designated skip trigger
    pub fn is_skip(&self) -> bool {
        matches!(self, UserInput::KeyDown { code } if code == SKIP_KEY)
    }

    /// Whether this input counts as a user gesture for autoplay purposes
    ///
    /// The narration unlock listens for clicks and keys only; touch is a
    /// gesture for the footer music.
    pub fn is_gesture(&self, include_touch: bool) -> bool {
        match self {
            UserInput::KeyDown { .. } | UserInput::Click { .. } => true,
            UserInput::TouchStart => include_touch,
        }
    }

    pub fn is_start_button_click(&self) -> bool {
        matches!(self, UserInput::Click { on_start_button: true })
    }
}
