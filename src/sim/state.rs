//! Simulation state
//!
//! Everything the frame step mutates lives in one [`SimulationState`] so the
//! whole resolver chain can run and be tested without a rendering context.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::combat::{Attack, Combat, Weapon};
use super::daynight::DayNightState;
use super::health::{DamageOutcome, PlayerHealth};
use super::pickup::PowerUpKind;
use super::player::{Player, Surface};
use super::world::{World, build_world};
use crate::consts::{SPAWN_X, SPAWN_Z};
use crate::tuning::Tuning;

/// Things that happened during a step, drained by the session for logging/HUD
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Jumped { air: bool },
    Landed { surface: Surface, height: f32 },
    LeftSupport,
    /// Damage value of an attack (there is nothing to apply it to)
    Attack(Attack),
    PowerUpCollected { id: u32, kind: PowerUpKind },
    WeaponEquipped { previous: Option<Weapon>, weapon: Weapon },
    HealthRefilled,
    InvincibilityGranted { until: f64 },
    DamageAbsorbed,
    DamageTaken { amount: u32, remaining: u32 },
    HealthDepleted,
    TorchToggled { on: bool },
}

/// Complete simulation state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationState {
    /// World layout seed
    pub seed: u64,
    pub tuning: Tuning,
    /// Simulation time in seconds; only advances while the step runs
    pub clock: f64,
    /// Wall-clock seconds spent outside the paused state. Invincibility
    /// expiry is stamped and checked against this.
    pub play_time: f64,
    /// Steps taken
    pub frame: u64,
    pub player: Player,
    pub health: PlayerHealth,
    pub combat: Combat,
    pub world: World,
    pub day_night: DayNightState,
    pub torch_on: bool,
    /// Events since the last drain
    #[serde(skip)]
    events: Vec<GameEvent>,
}

impl SimulationState {
    /// Fresh session with a generated arena
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let world = build_world(seed, &tuning);
        Self::with_world(seed, tuning, world)
    }

    /// Fresh session in a given arena
    pub fn with_world(seed: u64, tuning: Tuning, world: World) -> Self {
        Self {
            seed,
            clock: 0.0,
            play_time: 0.0,
            frame: 0,
            player: Player::spawn(SPAWN_X, SPAWN_Z, &tuning),
            health: PlayerHealth::new(tuning.max_health),
            combat: Combat::default(),
            world,
            day_night: DayNightState::new(&tuning.day_night),
            torch_on: false,
            events: Vec::new(),
            tuning,
        }
    }

    /// Add real elapsed seconds to the play time. Negative input is ignored.
    pub fn advance_play_time(&mut self, elapsed: f64) {
        if elapsed.is_finite() {
            self.play_time += elapsed.max(0.0);
        }
    }

    /// Eye position including the punch/kick dip
    pub fn camera_position(&self) -> Vec3 {
        let dip = self.combat.camera_dip(self.clock, &self.tuning);
        self.player.position - Vec3::Y * dip
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events recorded since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Damage the player at the current play time
    pub fn apply_damage(&mut self, amount: u32) -> DamageOutcome {
        let outcome = self.health.apply_damage(amount, self.play_time);
        match outcome {
            DamageOutcome::Absorbed => self.push_event(GameEvent::DamageAbsorbed),
            DamageOutcome::Applied { remaining } => self.push_event(GameEvent::DamageTaken { amount, remaining }),
            DamageOutcome::Depleted => {
                // Game over is not modelled; health simply stays at zero
                log::info!("Player health depleted");
                self.push_event(GameEvent::DamageTaken { amount, remaining: 0 });
                self.push_event(GameEvent::HealthDepleted);
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_spawns_on_ground() {
        let state = SimulationState::new(1, Tuning::default());
        assert!(state.player.on_ground);
        assert_eq!(state.health.current(), 100);
        assert_eq!(state.combat.equipped, None);
        assert_eq!(state.clock, 0.0);
    }

    #[test]
    fn test_damage_scenario_floors_at_zero() {
        let mut state = SimulationState::with_world(0, Tuning::default(), World::empty(&Tuning::default()));
        state.apply_damage(30);
        state.apply_damage(30);
        assert_eq!(state.health.current(), 40);
        assert_eq!(state.apply_damage(50), DamageOutcome::Depleted);
        assert_eq!(state.health.current(), 0);

        let events = state.drain_events();
        assert_eq!(events.last(), Some(&GameEvent::HealthDepleted));
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_camera_dips_during_punch() {
        let mut state = SimulationState::with_world(0, Tuning::default(), World::empty(&Tuning::default()));
        let eye = state.camera_position();
        let clock = state.clock;
        state.combat.primary_attack(clock, &state.tuning);
        assert!(state.camera_position().y < eye.y);
    }

    #[test]
    fn test_play_time_ignores_negative_and_nan() {
        let mut state = SimulationState::with_world(0, Tuning::default(), World::empty(&Tuning::default()));
        state.advance_play_time(1.5);
        state.advance_play_time(-3.0);
        state.advance_play_time(f64::NAN);
        assert_eq!(state.play_time, 1.5);
        assert_eq!(state.clock, 0.0);
    }

    #[test]
    fn test_state_serializes() {
        let state = SimulationState::new(5, Tuning::default());
        let json = serde_json::to_string(&state).unwrap();
        let back: SimulationState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.world.obstacles.len(), state.world.obstacles.len());
    }
}
