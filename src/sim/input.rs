//! Input latch
//!
//! Turns raw key/mouse events into held flags and one-shot edges, then hands a
//! [`FrameInput`] snapshot to the simulation once per frame. Edges (jump,
//! attacks) are consumed by the snapshot; key repeats never re-trigger them.

use serde::{Deserialize, Serialize};

use super::gate::PauseGate;
use super::look::LookBasis;

/// Keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Forward,
    Back,
    Left,
    Right,
    Jump,
    Run,
    Crouch,
    Torch,
    Pause,
}

impl Key {
    /// Map a DOM `KeyboardEvent.code`
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "KeyW" | "ArrowUp" => Some(Key::Forward),
            "KeyS" | "ArrowDown" => Some(Key::Back),
            "KeyA" | "ArrowLeft" => Some(Key::Left),
            "KeyD" | "ArrowRight" => Some(Key::Right),
            "Space" => Some(Key::Jump),
            "ShiftLeft" | "ShiftRight" => Some(Key::Run),
            "ControlLeft" | "ControlRight" | "KeyC" => Some(Key::Crouch),
            "KeyF" => Some(Key::Torch),
            "KeyP" => Some(Key::Pause),
            _ => None,
        }
    }
}

/// Mouse buttons the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseAction {
    /// Punch or use the equipped weapon
    Primary,
    Kick,
}

impl MouseAction {
    /// Map a DOM `MouseEvent.button`
    pub fn from_button(button: i16) -> Option<Self> {
        match button {
            0 => Some(MouseAction::Primary),
            1 => Some(MouseAction::Kick),
            _ => None,
        }
    }
}

/// What the caller has to do after a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResponse {
    Ignored,
    Latched,
    /// Route to [`PauseGate::toggle_pause`]
    TogglePause,
}

/// Input commands for a single frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameInput {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub running: bool,
    pub crouching: bool,
    pub torch_on: bool,
    /// Jump pressed since the last frame
    pub jump: bool,
    /// Primary attack pressed since the last frame
    pub primary: bool,
    /// Kick pressed since the last frame
    pub kick: bool,
    /// Camera-relative movement axes
    pub look: LookBasis,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputLatch {
    forward: bool,
    back: bool,
    left: bool,
    right: bool,
    running: bool,
    crouching: bool,
    torch_on: bool,
    jump_queued: bool,
    primary_queued: bool,
    kick_queued: bool,
    /// Keys currently held, for edge detection against auto-repeat
    jump_held: bool,
    crouch_held: bool,
    torch_held: bool,
    pause_held: bool,
}

impl InputLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key pressed. While paused only the pause key does anything.
    pub fn key_down(&mut self, key: Key, gate: &PauseGate) -> KeyResponse {
        if gate.is_paused() && key != Key::Pause {
            return KeyResponse::Ignored;
        }

        match key {
            Key::Pause => {
                if self.pause_held {
                    return KeyResponse::Ignored;
                }
                self.pause_held = true;
                return KeyResponse::TogglePause;
            }
            Key::Forward => self.forward = true,
            Key::Back => self.back = true,
            Key::Left => self.left = true,
            Key::Right => self.right = true,
            Key::Run => self.running = true,
            Key::Torch => {
                if self.torch_held {
                    return KeyResponse::Ignored;
                }
                self.torch_held = true;
                self.torch_on = !self.torch_on;
            }
            Key::Crouch => {
                if self.crouch_held || !gate.simulation_active() {
                    return KeyResponse::Ignored;
                }
                self.crouch_held = true;
                self.crouching = !self.crouching;
            }
            Key::Jump => {
                if self.jump_held || !gate.simulation_active() {
                    return KeyResponse::Ignored;
                }
                self.jump_held = true;
                self.jump_queued = true;
            }
        }
        KeyResponse::Latched
    }

    /// Key released. Always processed so nothing stays stuck across a pause.
    pub fn key_up(&mut self, key: Key) {
        match key {
            Key::Forward => self.forward = false,
            Key::Back => self.back = false,
            Key::Left => self.left = false,
            Key::Right => self.right = false,
            Key::Run => self.running = false,
            Key::Jump => self.jump_held = false,
            Key::Crouch => self.crouch_held = false,
            Key::Torch => self.torch_held = false,
            Key::Pause => self.pause_held = false,
        }
    }

    /// Mouse button pressed. Only while playing and not mid-attack.
    pub fn mouse_down(&mut self, action: MouseAction, gate: &PauseGate, attack_animating: bool) -> bool {
        if !gate.simulation_active() || attack_animating {
            return false;
        }
        match action {
            MouseAction::Primary => self.primary_queued = true,
            MouseAction::Kick => self.kick_queued = true,
        }
        true
    }

    /// Drop all held movement (focus loss)
    pub fn release_all(&mut self) {
        self.forward = false;
        self.back = false;
        self.left = false;
        self.right = false;
        self.running = false;
        self.jump_held = false;
        self.crouch_held = false;
        self.torch_held = false;
        self.pause_held = false;
    }

    #[inline]
    pub fn torch_on(&self) -> bool {
        self.torch_on
    }

    /// Snapshot for this frame, consuming the one-shot edges
    pub fn take_frame(&mut self, look: LookBasis) -> FrameInput {
        FrameInput {
            forward: self.forward,
            back: self.back,
            left: self.left,
            right: self.right,
            running: self.running,
            crouching: self.crouching,
            torch_on: self.torch_on,
            jump: std::mem::take(&mut self.jump_queued),
            primary: std::mem::take(&mut self.primary_queued),
            kick: std::mem::take(&mut self.kick_queued),
            look,
        }
    }
}
