//! Inactivity timer hiding on-screen controls.
//!
//! Controls may only hide while fullscreen, playing and with no menu open.
//! The timer holds a deadline rather than a running task; the driver sleeps
//! until [`ControlsVisibilityTimer::deadline`] and then calls `poll`.

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlsPhase {
    Visible,
    Hidden,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Gates {
    fullscreen: bool,
    playing: bool,
    menu_open: bool,
}

impl Gates {
    fn allow_hiding(&self) -> bool {
        self.fullscreen && self.playing && !self.menu_open
    }
}

/// Two-state visibility machine driven by an inactivity deadline.
#[derive(Debug)]
pub struct ControlsVisibilityTimer {
    hide_after: Duration,
    phase: ControlsPhase,
    gates: Gates,
    deadline: Option<Instant>,
}

impl ControlsVisibilityTimer {
    pub fn new(hide_after: Duration) -> Self {
        Self {
            hide_after,
            phase: ControlsPhase::Visible,
            gates: Gates::default(),
            deadline: None,
        }
    }

    pub fn phase(&self) -> ControlsPhase {
        self.phase
    }

    pub fn is_visible(&self) -> bool {
        self.phase == ControlsPhase::Visible
    }

    /// When the controls hide if nothing else happens.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Re-evaluate all gating conditions at once.
    ///
    /// Closing a gate shows the controls and cancels the countdown. The
    /// countdown only re-arms once every gate is open again; reporting the
    /// same gates while counting down leaves the deadline untouched.
    pub fn set_gates(&mut self, fullscreen: bool, playing: bool, menu_open: bool, now: Instant) {
        self.gates = Gates {
            fullscreen,
            playing,
            menu_open,
        };

        if !self.gates.allow_hiding() {
            self.phase = ControlsPhase::Visible;
            self.deadline = None;
        } else if self.phase == ControlsPhase::Visible && self.deadline.is_none() {
            self.deadline = Some(now + self.hide_after);
        }
    }

    /// Pointer move or key press: show and restart the countdown.
    pub fn on_activity(&mut self, now: Instant) {
        self.phase = ControlsPhase::Visible;
        self.deadline = self
            .gates
            .allow_hiding()
            .then(|| now + self.hide_after);
    }

    /// Hide the controls if the deadline has passed.
    pub fn poll(&mut self, now: Instant) {
        if let Some(deadline) = self.deadline {
            if now >= deadline && self.gates.allow_hiding() {
                self.phase = ControlsPhase::Hidden;
                self.deadline = None;
            }
        }
    }

    /// Drop the countdown with the player.
    pub fn cancel(&mut self) {
        self.deadline = None;
        self.phase = ControlsPhase::Visible;
    }
}
