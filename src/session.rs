//! Session driver
//!
//! Owns the simulation state together with the input latch, look control
//! and pause gate, and exposes the entry points the platform layer calls:
//! raw input events, pointer-lock lifecycle events, the per-frame step and
//! the 1 Hz coarse tick.

use std::rc::Rc;

use crate::hud::HudModel;
use crate::settings::{QualityPreset, Settings};
use crate::sim::gate::{PauseGate, PointerCapture, PresentationPort};
use crate::sim::health::{DamageOutcome, HealthChannel};
use crate::sim::input::{InputLatch, Key, KeyResponse, MouseAction};
use crate::sim::look::LookControl;
use crate::sim::state::{GameEvent, SimulationState};
use crate::sim::tick;
use crate::tuning::Tuning;

pub struct Session {
    pub state: SimulationState,
    pub look: LookControl,
    pub settings: Settings,
    latch: InputLatch,
    gate: PauseGate,
    health: Rc<HealthChannel>,
}

impl Session {
    pub fn new(seed: u64, tuning: Tuning, settings: Settings) -> Self {
        Self::with_state(SimulationState::new(seed, tuning), settings)
    }

    pub fn with_state(state: SimulationState, settings: Settings) -> Self {
        let health = Rc::new(HealthChannel::new(state.health.snapshot()));
        Self {
            state,
            look: LookControl::default(),
            settings,
            latch: InputLatch::new(),
            gate: PauseGate::new(),
            health,
        }
    }

    /// Show the initial click-to-play overlay
    pub fn mount(&mut self, port: &mut dyn PresentationPort) {
        self.gate.mount(port);
    }

    #[inline]
    pub fn gate(&self) -> &PauseGate {
        &self.gate
    }

    /// Shared handle for HUD readers
    pub fn health_channel(&self) -> Rc<HealthChannel> {
        Rc::clone(&self.health)
    }

    // === Input ===

    /// `keydown` with a DOM key code. Returns true if the key is one of ours.
    pub fn key_down(&mut self, code: &str, port: &mut dyn PresentationPort, capture: &mut dyn PointerCapture) -> bool {
        let Some(key) = Key::from_code(code) else {
            return false;
        };
        if self.latch.key_down(key, &self.gate) == KeyResponse::TogglePause {
            self.gate.toggle_pause(port, capture);
        }
        true
    }

    pub fn key_up(&mut self, code: &str) -> bool {
        let Some(key) = Key::from_code(code) else {
            return false;
        };
        self.latch.key_up(key);
        true
    }

    pub fn mouse_down(&mut self, button: i16) -> bool {
        let Some(action) = MouseAction::from_button(button) else {
            return false;
        };
        self.latch
            .mouse_down(action, &self.gate, self.state.combat.is_animating())
    }

    /// Pointer movement in pixels; only turns the camera while captured
    pub fn mouse_move(&mut self, dx: f32, dy: f32) {
        if self.gate.look_active() {
            self.look
                .apply_mouse_delta(dx, dy, self.settings.mouse_sensitivity, self.settings.invert_y);
        }
    }

    /// Window lost focus: nothing should stay held
    pub fn focus_lost(&mut self) {
        self.latch.release_all();
    }

    /// Switch the graphics preset and persist the preferences
    pub fn set_quality(&mut self, preset: QualityPreset) {
        if self.settings.quality == preset {
            return;
        }
        log::info!("Quality {} -> {}", self.settings.quality, preset);
        self.settings.quality = preset;
        self.settings.save();
    }

    // === Pointer lock lifecycle ===

    pub fn overlay_clicked(&mut self, port: &mut dyn PresentationPort, capture: &mut dyn PointerCapture) {
        self.gate.overlay_clicked(port, capture);
    }

    pub fn lock_acquired(&mut self, port: &mut dyn PresentationPort) {
        self.gate.lock_acquired(port);
    }

    pub fn lock_lost(&mut self, port: &mut dyn PresentationPort) {
        self.gate.lock_lost(port);
    }

    pub fn lock_failed(&mut self, port: &mut dyn PresentationPort) {
        self.gate.lock_failed(port);
    }

    // === Driving ===

    /// Per-frame callback with the real seconds since the last frame.
    /// Play time runs whenever the game is not paused; the simulation only
    /// steps while playing, then publishes health. Returns the step's events.
    pub fn frame(&mut self, elapsed: f64) -> Vec<GameEvent> {
        let input = self.latch.take_frame(self.look.basis());
        if self.gate.environment_active() {
            self.state.advance_play_time(elapsed);
        }
        if !self.gate.simulation_active() {
            return Vec::new();
        }

        tick::step(&mut self.state, &input, elapsed as f32);
        self.health.publish(self.state.health.snapshot());

        let events = self.state.drain_events();
        for event in &events {
            log::trace!("{:?}", event);
        }
        events
    }

    /// 1 Hz callback. Frozen while paused; returns whether it ran.
    pub fn coarse_tick(&mut self) -> bool {
        if !self.gate.environment_active() {
            return false;
        }
        tick::coarse_tick(&mut self.state);
        true
    }

    /// Hurt the player now (no damage sources exist in the arena yet)
    pub fn damage_player(&mut self, amount: u32) -> DamageOutcome {
        let outcome = self.state.apply_damage(amount);
        self.health.publish(self.state.health.snapshot());
        outcome
    }

    /// HUD view of the published health at the current play time
    pub fn hud(&self) -> HudModel {
        HudModel::from_snapshot(&self.health.read(), self.state.play_time)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::consts::SPAWN_Z;
    use crate::sim::gate::GateState;
    use crate::sim::gate::tests::{FakeCapture, FakeOverlay};
    use crate::sim::pickup::{PowerUpKind, WorldPowerUp};
    use crate::sim::world::World;

    const DT: f64 = 1.0 / 60.0;

    fn session() -> Session {
        let tuning = Tuning::default();
        let world = World::empty(&tuning);
        Session::with_state(SimulationState::with_world(0, tuning, world), Settings::default())
    }

    fn playing() -> (Session, FakeOverlay, FakeCapture) {
        let mut s = session();
        let mut overlay = FakeOverlay::default();
        let mut capture = FakeCapture::default();
        s.mount(&mut overlay);
        s.overlay_clicked(&mut overlay, &mut capture);
        s.lock_acquired(&mut overlay);
        (s, overlay, capture)
    }

    #[test]
    fn test_nothing_moves_before_lock() {
        let mut s = session();
        let mut overlay = FakeOverlay::default();
        let mut capture = FakeCapture::default();
        s.mount(&mut overlay);
        s.key_down("KeyW", &mut overlay, &mut capture);
        let start = s.state.player.position;
        s.frame(DT);
        assert_eq!(s.state.player.position, start);
        assert_eq!(s.state.clock, 0.0);
        // Environment still runs while unlocked
        assert!(s.coarse_tick());
    }

    #[test]
    fn test_walks_while_playing() {
        let (mut s, mut overlay, mut capture) = playing();
        assert!(s.key_down("KeyW", &mut overlay, &mut capture));
        for _ in 0..30 {
            s.frame(DT);
        }
        assert!(s.state.player.position.z < SPAWN_Z - 1.0);
        assert!(!s.key_down("KeyQ", &mut overlay, &mut capture));
    }

    #[test]
    fn test_pause_freezes_simulation_and_environment() {
        let (mut s, mut overlay, mut capture) = playing();
        s.key_down("KeyP", &mut overlay, &mut capture);
        assert_eq!(capture.releases, 1);
        s.lock_lost(&mut overlay);
        assert_eq!(s.gate().state(), GateState::Paused);
        assert_eq!(overlay.last(), Some("paused"));

        let day = s.state.day_night.current_time;
        let clock = s.state.clock;
        s.key_down("KeyW", &mut overlay, &mut capture);
        s.frame(DT);
        assert!(!s.coarse_tick());
        assert_eq!(s.state.clock, clock);
        assert_eq!(s.state.day_night.current_time, day);

        // Pause key auto-repeat does not unpause
        s.key_down("KeyP", &mut overlay, &mut capture);
        assert!(s.gate().is_paused());
        s.key_up("KeyP");
        s.key_down("KeyP", &mut overlay, &mut capture);
        assert!(!s.gate().is_paused());
        assert_eq!(overlay.last(), Some("instructions"));
    }

    #[test]
    fn test_mouse_look_only_when_locked() {
        let mut s = session();
        s.mouse_move(100.0, 0.0);
        assert_eq!(s.look.yaw, 0.0);

        let (mut s, _, _) = playing();
        s.mouse_move(100.0, 0.0);
        assert!(s.look.yaw < 0.0);
    }

    #[test]
    fn test_degraded_play_without_pointer_lock() {
        let mut s = session();
        let mut overlay = FakeOverlay::default();
        let mut capture = FakeCapture {
            unsupported: true,
            ..Default::default()
        };
        s.mount(&mut overlay);
        s.overlay_clicked(&mut overlay, &mut capture);
        assert_eq!(s.gate().state(), GateState::PlayingUncaptured);

        s.key_down("KeyW", &mut overlay, &mut capture);
        s.frame(DT);
        assert!(s.state.player.position.z < SPAWN_Z);
        s.mouse_move(100.0, 0.0);
        assert_eq!(s.look.yaw, 0.0);
    }

    #[test]
    fn test_health_channel_follows_pickups_and_damage() {
        let (mut s, _, _) = playing();
        let channel = s.health_channel();
        let rev = channel.revision();

        assert_eq!(s.damage_player(30), DamageOutcome::Applied { remaining: 70 });
        assert_eq!(channel.read().current, 70);
        assert!(channel.revision() > rev);

        s.state.world.power_ups.push(WorldPowerUp {
            id: 1,
            kind: PowerUpKind::Invincibility,
            position: Vec3::new(0.0, 1.0, SPAWN_Z),
            collected: false,
        });
        let events = s.frame(DT);
        assert!(events.iter().any(|e| matches!(e, GameEvent::InvincibilityGranted { .. })));
        assert!(channel.read().invincible_until.is_some());
        assert!(s.hud().invincibility_secs.is_some());
        assert_eq!(s.damage_player(50), DamageOutcome::Absorbed);
        assert_eq!(s.hud().health_label, "70 / 100");
    }

    /// Playing session that has just picked up a 10 s invincibility
    fn invincible() -> (Session, FakeOverlay, FakeCapture) {
        let (mut s, overlay, capture) = playing();
        s.state.world.power_ups.push(WorldPowerUp {
            id: 1,
            kind: PowerUpKind::Invincibility,
            position: Vec3::new(0.0, 1.0, SPAWN_Z),
            collected: false,
        });
        s.frame(DT);
        assert!(s.hud().invincibility_secs.is_some());
        (s, overlay, capture)
    }

    #[test]
    fn test_invincibility_expires_while_unlocked() {
        let (mut s, mut overlay, _) = invincible();
        // Escape releases the lock without pausing
        s.lock_lost(&mut overlay);
        assert_eq!(s.gate().state(), GateState::Idle);

        let clock = s.state.clock;
        for _ in 0..12 {
            s.frame(1.0);
            s.coarse_tick();
        }
        assert_eq!(s.state.clock, clock);
        assert_eq!(s.hud().invincibility_secs, None);
        assert_eq!(s.damage_player(10), DamageOutcome::Applied { remaining: 90 });
    }

    #[test]
    fn test_invincibility_follows_wall_time_on_slow_frames() {
        let (mut s, _, _) = invincible();
        // 4 fps for 12 s; each step is capped but play time is not
        for _ in 0..48 {
            s.frame(0.25);
        }
        assert!(s.state.clock < 6.0);
        assert!(s.state.play_time > 12.0);
        assert_eq!(s.damage_player(10), DamageOutcome::Applied { remaining: 90 });
    }

    #[test]
    fn test_pause_freezes_invincibility_countdown() {
        let (mut s, mut overlay, mut capture) = invincible();
        let remaining = |s: &Session| s.state.health.invincibility_remaining(s.state.play_time);
        let before = remaining(&s);

        s.key_down("KeyP", &mut overlay, &mut capture);
        s.lock_lost(&mut overlay);
        for _ in 0..60 {
            s.frame(1.0);
        }
        assert_eq!(remaining(&s), before);
        assert_eq!(s.damage_player(10), DamageOutcome::Absorbed);

        s.key_up("KeyP");
        s.key_down("KeyP", &mut overlay, &mut capture);
        for _ in 0..4 {
            s.frame(1.0);
        }
        let left = remaining(&s).unwrap_or_default();
        assert!((left - 6.0).abs() < 1e-6, "{left}");
    }

    #[test]
    fn test_quality_change_reaches_renderer_settings() {
        let mut s = session();
        s.set_quality("high".parse().unwrap());
        assert_eq!(s.settings.quality, QualityPreset::High);
        assert_eq!(s.settings.quality.cylinder_segments(), 24);
        // Other preferences survive the switch
        assert_eq!(s.settings.mouse_sensitivity, Settings::default().mouse_sensitivity);
    }

    #[test]
    fn test_attack_click_dropped_mid_animation() {
        let (mut s, _, _) = playing();
        assert!(s.mouse_down(0));
        s.frame(DT);
        assert!(!s.mouse_down(0));
        assert!(!s.mouse_down(2));
    }
}
