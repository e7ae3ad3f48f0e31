//! Data-driven game balance
//!
//! Every gameplay constant lives here so a JSON document can override any
//! subset of them. Missing fields fall back to the shipped defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::combat::DamageTable;
use crate::sim::daynight::{CycleError, DayNightCycle};

/// Rejected tuning document
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("tuning value `{field}` must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("crouch eye height {crouch} must not exceed standing eye height {standing}")]
    CrouchTallerThanStanding { crouch: f32, standing: f32 },
    #[error("ground size {ground_size} leaves no room for a player of radius {player_radius}")]
    ArenaTooSmall { ground_size: f32, player_radius: f32 },
    #[error("invalid day-night cycle: {0}")]
    Cycle(#[from] CycleError),
}

/// Gameplay constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Vertical motion ===
    /// Downward acceleration (units/s²)
    pub gravity: f32,
    /// Upward velocity applied by a jump (units/s)
    pub jump_impulse: f32,
    /// Extra jumps allowed before touching a surface again
    pub max_air_jumps: u32,
    /// Small tolerance that catches landings across thin frame steps
    pub landing_epsilon: f32,

    // === Player body ===
    pub eye_height: f32,
    pub crouch_eye_height: f32,
    /// Half-width of the player's collision column
    pub player_radius: f32,
    /// Column extent above the eye
    pub headroom: f32,

    // === Horizontal motion ===
    /// Terminal walking speed (units/s)
    pub base_speed: f32,
    pub run_multiplier: f32,
    pub crouch_multiplier: f32,
    /// Exponential velocity damping rate (1/s)
    pub damping: f32,

    // === Arena ===
    /// Edge length of the square ground plane
    pub ground_size: f32,

    // === Combat ===
    pub damage: DamageTable,
    /// Length of the primary attack animation (seconds)
    pub attack_duration: f32,
    /// Peak sword swing (radians)
    pub max_swing_angle: f32,
    /// Peak gun recoil (units, camera space)
    pub max_recoil: f32,
    /// Camera drop during a punch or kick
    pub melee_dip: f32,
    /// How long the punch/kick dip lasts (seconds)
    pub melee_dip_duration: f32,

    // === Pickups & health ===
    pub pickup_distance: f32,
    /// Invincibility granted by the power-up (seconds)
    pub invincibility_duration: f32,
    pub max_health: u32,

    // === Environment ===
    pub day_night: DayNightCycle,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 30.0,
            jump_impulse: 10.0,
            max_air_jumps: 1,
            landing_epsilon: 0.05,

            eye_height: 1.7,
            crouch_eye_height: 1.0,
            player_radius: 0.5,
            headroom: 0.2,

            base_speed: 8.0,
            run_multiplier: 1.8,
            crouch_multiplier: 0.5,
            damping: 10.0,

            ground_size: 100.0,

            damage: DamageTable::default(),
            attack_duration: 0.2,
            max_swing_angle: 1.2,
            max_recoil: 0.12,
            melee_dip: 0.08,
            melee_dip_duration: 0.15,

            pickup_distance: 2.0,
            invincibility_duration: 10.0,
            max_health: 100,

            day_night: DayNightCycle::default(),
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON document and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("gravity", self.gravity),
            ("jump_impulse", self.jump_impulse),
            ("eye_height", self.eye_height),
            ("crouch_eye_height", self.crouch_eye_height),
            ("player_radius", self.player_radius),
            ("base_speed", self.base_speed),
            ("damping", self.damping),
            ("ground_size", self.ground_size),
            ("attack_duration", self.attack_duration),
            ("pickup_distance", self.pickup_distance),
            ("invincibility_duration", self.invincibility_duration),
            ("max_health", self.max_health as f32),
        ];
        for (field, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(TuningError::NotPositive { field, value });
            }
        }
        if self.crouch_eye_height > self.eye_height {
            return Err(TuningError::CrouchTallerThanStanding {
                crouch: self.crouch_eye_height,
                standing: self.eye_height,
            });
        }
        if self.ground_size / 2.0 <= self.player_radius {
            return Err(TuningError::ArenaTooSmall {
                ground_size: self.ground_size,
                player_radius: self.player_radius,
            });
        }
        self.day_night.validate()?;
        Ok(())
    }

    /// Eye height for the given stance
    #[inline]
    pub fn eye_height_for(&self, crouching: bool) -> f32 {
        if crouching { self.crouch_eye_height } else { self.eye_height }
    }

    /// How far from the arena center the player's center may go on each axis
    #[inline]
    pub fn arena_limit(&self) -> f32 {
        self.ground_size / 2.0 - self.player_radius
    }

    /// LocalStorage key for a tuning override (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "arena_survival_tuning";

    /// Load a tuning override from LocalStorage, falling back to defaults (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(tuning) => {
                        log::info!("Loaded tuning override from LocalStorage");
                        return tuning;
                    }
                    Err(e) => log::warn!("Ignoring tuning override: {}", e),
                }
            }
        }

        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
