//! Player tuning knobs.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunable constants of the player engine.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlayerSettings {
    /// Inactivity before controls hide in fullscreen playback.
    #[serde(default = "default_controls_hide_after_secs")]
    pub controls_hide_after_secs: f64,

    /// Step for the left/right arrow keys.
    #[serde(default = "default_seek_step_secs")]
    pub seek_step_secs: f64,

    /// Step for the up/down arrow keys.
    #[serde(default = "default_volume_step")]
    pub volume_step: f64,

    /// Volume restored when unmuting at zero volume.
    #[serde(default = "default_unmute_volume")]
    pub unmute_volume: f64,

    /// Interval of progress reports while playing.
    #[serde(default = "default_progress_interval_secs")]
    pub progress_interval_secs: f64,
}

fn default_controls_hide_after_secs() -> f64 {
    5.0
}
fn default_seek_step_secs() -> f64 {
    10.0
}
fn default_volume_step() -> f64 {
    0.1
}
fn default_unmute_volume() -> f64 {
    0.5
}
fn default_progress_interval_secs() -> f64 {
    5.0
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            controls_hide_after_secs: default_controls_hide_after_secs(),
            seek_step_secs: default_seek_step_secs(),
            volume_step: default_volume_step(),
            unmute_volume: default_unmute_volume(),
            progress_interval_secs: default_progress_interval_secs(),
        }
    }
}

impl PlayerSettings {
    /// Inactivity window of the controls timer.
    pub fn controls_hide_after(&self) -> Duration {
        secs(self.controls_hide_after_secs)
    }

    /// Progress report interval. Never shorter than 100ms.
    pub fn progress_interval(&self) -> Duration {
        secs(self.progress_interval_secs).max(Duration::from_millis(100))
    }
}

fn secs(value: f64) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::from_secs_f64(value)
    } else {
        Duration::ZERO
    }
}
