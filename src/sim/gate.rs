//! Pointer-lock / pause gate
//!
//! Decides whether the simulation step runs at all and whether mouse-look is
//! live, and keeps the externally-owned overlay (blocker, instructions,
//! paused message) in sync. The overlay and the pointer-lock API are reached
//! through the [`PresentationPort`] and [`PointerCapture`] traits so the gate
//! can be driven without a browser.
//!
//! States: unlocked+unpaused (initial), locked+unpaused (playing),
//! unlocked+paused. Locked+paused only exists between releasing the lock and
//! the browser confirming it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Overlay visibility, owned by the presentation layer
pub trait PresentationPort {
    /// Blocker with the click-to-play instructions
    fn show_instructions(&mut self);
    /// Blocker with the paused message
    fn show_paused(&mut self);
    /// Hide the whole overlay
    fn hide_overlay(&mut self);
}

/// OS-level mouse capture
pub trait PointerCapture {
    /// Ask for the lock. Success is confirmed later by [`PauseGate::lock_acquired`].
    fn request_lock(&mut self) -> Result<(), LockError>;
    /// Give the lock back. Confirmed later by [`PauseGate::lock_lost`].
    fn release_lock(&mut self);
}

/// Pointer lock could not be requested
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LockError {
    #[error("pointer lock is not supported here")]
    Unsupported,
    #[error("pointer lock request was rejected: {0}")]
    Rejected(String),
}

/// Whether the pointer lock API has worked so far
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CaptureSupport {
    #[default]
    Available,
    Unavailable,
}

/// Coarse view of the gate for HUD/debugging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateState {
    /// Waiting for a click
    Idle,
    /// Locked and running
    Playing,
    /// Running without mouse capture (pointer lock unavailable)
    PlayingUncaptured,
    Paused,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PauseGate {
    locked: bool,
    paused: bool,
    capture: CaptureSupport,
    /// Playing without capture after pointer lock failed
    uncaptured_play: bool,
}

impl PauseGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial overlay: click-to-play
    pub fn mount(&mut self, port: &mut dyn PresentationPort) {
        port.show_instructions();
    }

    /// Click on the blocking overlay
    pub fn overlay_clicked(&mut self, port: &mut dyn PresentationPort, capture: &mut dyn PointerCapture) {
        if self.paused || self.locked || self.uncaptured_play {
            return;
        }
        match capture.request_lock() {
            Ok(()) => log::debug!("Pointer lock requested"),
            Err(e) => self.degrade(port, &e),
        }
    }

    /// The browser refused the lock after the request (pointerlockerror)
    pub fn lock_failed(&mut self, port: &mut dyn PresentationPort) {
        self.degrade(port, &LockError::Rejected("pointerlockerror".to_string()));
    }

    fn degrade(&mut self, port: &mut dyn PresentationPort, error: &LockError) {
        log::warn!("{}; playing without mouse capture", error);
        self.capture = CaptureSupport::Unavailable;
        self.locked = false;
        if self.paused {
            port.show_paused();
        } else {
            self.uncaptured_play = true;
            port.hide_overlay();
        }
    }

    /// Lock-acquired event: always clears the pause
    pub fn lock_acquired(&mut self, port: &mut dyn PresentationPort) {
        log::info!("Pointer lock acquired");
        self.locked = true;
        self.paused = false;
        self.uncaptured_play = false;
        self.capture = CaptureSupport::Available;
        port.hide_overlay();
    }

    /// Lock-lost event (Escape, focus loss, or our own release)
    pub fn lock_lost(&mut self, port: &mut dyn PresentationPort) {
        log::info!("Pointer lock released");
        self.locked = false;
        if self.paused {
            port.show_paused();
        } else {
            port.show_instructions();
        }
    }

    /// P key: flip the pause flag
    pub fn toggle_pause(&mut self, port: &mut dyn PresentationPort, capture: &mut dyn PointerCapture) {
        self.paused = !self.paused;
        if self.paused {
            log::info!("Paused");
            self.uncaptured_play = false;
            if self.locked {
                // lock_lost follows and shows the paused message
                capture.release_lock();
            } else {
                port.show_paused();
            }
        } else {
            log::info!("Unpaused");
            if self.locked {
                port.hide_overlay();
            } else {
                port.show_instructions();
            }
        }
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    #[inline]
    pub fn capture_support(&self) -> CaptureSupport {
        self.capture
    }

    /// Motion, combat and pickups run only here
    #[inline]
    pub fn simulation_active(&self) -> bool {
        !self.paused && (self.locked || self.uncaptured_play)
    }

    /// Day-night and the HUD countdown only care about the pause flag
    #[inline]
    pub fn environment_active(&self) -> bool {
        !self.paused
    }

    /// Mouse movement turns the camera only while captured
    #[inline]
    pub fn look_active(&self) -> bool {
        self.locked && !self.paused
    }

    pub fn state(&self) -> GateState {
        if self.paused {
            GateState::Paused
        } else if self.locked {
            GateState::Playing
        } else if self.uncaptured_play {
            GateState::PlayingUncaptured
        } else {
            GateState::Idle
        }
    }
}
