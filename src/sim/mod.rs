//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Time comes in as a frame delta, never from a wall clock
//! - Seeded RNG only (world layout)
//! - Stable iteration order (obstacles and power-ups in build order)
//! - No rendering or platform dependencies; the overlay and pointer lock are
//!   reached through the traits in [`gate`]

pub mod combat;
pub mod daynight;
pub mod gate;
pub mod geometry;
pub mod health;
pub mod horizontal;
pub mod input;
pub mod look;
pub mod pickup;
pub mod player;
pub mod state;
pub mod tick;
pub mod vertical;
pub mod world;

pub use combat::{Attack, AttackKind, Combat, DamageTable, Weapon, WeaponPose};
pub use daynight::{CycleError, DayNightCycle, DayNightState, Lighting, Phase};
pub use gate::{CaptureSupport, GateState, LockError, PauseGate, PointerCapture, PresentationPort};
pub use geometry::{Aabb, Footprint, Obstacle, ObstacleKind, Shape, bounds_at, footprint_at};
pub use health::{DamageOutcome, HealthChannel, HealthSnapshot, PlayerHealth};
pub use horizontal::{HorizontalOutcome, resolve_horizontal};
pub use input::{FrameInput, InputLatch, Key, KeyResponse, MouseAction};
pub use look::{LookBasis, LookControl};
pub use pickup::{PowerUpKind, WorldPowerUp};
pub use player::{Player, Surface};
pub use state::{GameEvent, SimulationState};
pub use tick::{coarse_tick, step};
pub use vertical::{VerticalOutcome, resolve_vertical};
pub use world::{World, build_world};
