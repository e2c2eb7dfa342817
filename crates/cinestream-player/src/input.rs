//! Keyboard mapping onto player actions.

use crate::manifest::QualitySelection;
use crate::settings::PlayerSettings;

/// Keys the player reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Char(char),
}

/// Where keyboard focus was when the key was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusTarget {
    #[default]
    Player,
    /// A text field (search box, comment editor). Shortcuts are suppressed.
    TextInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub focus: FocusTarget,
}

impl KeyPress {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            focus: FocusTarget::Player,
        }
    }

    pub fn in_text_input(key: Key) -> Self {
        Self {
            key,
            focus: FocusTarget::TextInput,
        }
    }
}

/// Operation on the playback state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerAction {
    TogglePlay,
    Play,
    Pause,
    SeekTo(f64),
    SeekBy(f64),
    SetVolume(f64),
    AdjustVolume(f64),
    ToggleMute,
    ToggleFullscreen,
    TogglePip,
    SetQuality(QualitySelection),
    /// Re-issue a play request the pipeline rejected. Failures reported with
    /// `retryable: false` are not affected.
    Retry,
}

/// Fixed key table.
#[derive(Debug, Clone)]
pub struct InputDispatcher {
    seek_step: f64,
    volume_step: f64,
}

impl InputDispatcher {
    pub fn new(settings: &PlayerSettings) -> Self {
        Self {
            seek_step: settings.seek_step_secs,
            volume_step: settings.volume_step,
        }
    }

    /// Map a key press. Returns `None` for unmapped keys or text-input focus.
    pub fn dispatch(&self, press: KeyPress) -> Option<PlayerAction> {
        if press.focus == FocusTarget::TextInput {
            return None;
        }

        let action = match press.key {
            Key::Space => PlayerAction::TogglePlay,
            Key::ArrowLeft => PlayerAction::SeekBy(-self.seek_step),
            Key::ArrowRight => PlayerAction::SeekBy(self.seek_step),
            Key::ArrowUp => PlayerAction::AdjustVolume(self.volume_step),
            Key::ArrowDown => PlayerAction::AdjustVolume(-self.volume_step),
            Key::Char(c) => match c.to_ascii_lowercase() {
                'f' => PlayerAction::ToggleFullscreen,
                'm' => PlayerAction::ToggleMute,
                _ => return None,
            },
        };
        Some(action)
    }
}

impl Default for InputDispatcher {
    fn default() -> Self {
        Self::new(&PlayerSettings::default())
    }
}
