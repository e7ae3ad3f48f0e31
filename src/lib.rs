//! Arena Survival - a first-person survive-the-arena mini-game
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (player controller, collisions, combat, pickups, day-night)
//! - `session`: Input routing, pause/pointer-lock gate and the per-frame driver
//! - `renderer`: WebGPU rendering pipeline
//! - `platform`: Browser/native platform abstraction (clock, DOM overlay, pointer lock)
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences

pub mod hud;
pub mod platform;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use hud::HudModel;
pub use session::Session;
pub use settings::{QualityPreset, Settings};
pub use tuning::{Tuning, TuningError};

use glam::{Vec2, Vec3};

/// Game configuration constants
pub mod consts {
    /// Delta used for the very first frame (no previous timestamp yet)
    pub const NOMINAL_DT: f32 = 1.0 / 60.0;
    /// Largest per-frame delta the simulation accepts (tab suspension, debugger pauses)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Period of the coarse environment tick, in seconds
    pub const COARSE_TICK_SECS: f32 = 1.0;

    /// Spawn point on the ground plane (x, z)
    pub const SPAWN_X: f32 = 0.0;
    pub const SPAWN_Z: f32 = 5.0;
    /// Random world placements keep this far away from the spawn point
    pub const SPAWN_CLEARANCE: f32 = 6.0;

    /// Height of the walkable ground plane
    pub const GROUND_Y: f32 = 0.0;
    /// Lift of the collision column above the feet so a snapped stance never touches its own floor
    pub const COLLISION_SKIN: f32 = 0.01;

    /// Boundary walls
    pub const WALL_HEIGHT: f32 = 10.0;
    pub const WALL_THICKNESS: f32 = 2.0;

    /// Height at which power-ups float above the ground
    pub const POWER_UP_HEIGHT: f32 = 1.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert a 0xRRGGBB color to linear-ish RGB in [0, 1]
#[inline]
pub fn rgb(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

/// Drop the vertical component: world (x, y, z) -> planar (x, z)
#[inline]
pub fn planar(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Linear interpolation that returns `a` exactly at `t == 0` and `b` exactly at `t == 1`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    if t >= 1.0 { b } else { a + (b - a) * t }
}

/// Component-wise [`lerp`] for colors
#[inline]
pub fn lerp_vec3(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    Vec3::new(lerp(a.x, b.x, t), lerp(a.y, b.y, t), lerp(a.z, b.z, t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_channels() {
        let c = rgb(0xff8000);
        assert_eq!(c.x, 1.0);
        assert!((c.y - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.z, 0.0);
    }

    #[test]
    fn test_lerp_endpoints_are_exact() {
        assert_eq!(lerp(0.3, 0.9, 0.0), 0.3);
        assert_eq!(lerp(0.3, 0.9, 1.0), 0.9);
        assert!((lerp(0.0, 1.0, 0.25) - 0.25).abs() < 1e-6);
    }
}
