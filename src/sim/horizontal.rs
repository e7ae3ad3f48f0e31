//! Horizontal motion with axis-separated collision
//!
//! Strafe and forward movement are applied as two sequential sub-steps. A
//! sub-step whose destination puts the collision column inside an obstacle is
//! reverted on its own, which lets the player slide along walls.

use glam::{Vec2, Vec3};

use super::geometry::{Obstacle, intersects_any};
use super::input::FrameInput;
use super::player::Player;
use crate::tuning::Tuning;

/// Which sub-steps were blocked this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HorizontalOutcome {
    pub strafe_blocked: bool,
    pub forward_blocked: bool,
    /// Position was pulled back inside the arena
    pub clamped: bool,
}

/// Speed multiplier for the current stance
fn speed_multiplier(player: &Player, tuning: &Tuning) -> f32 {
    if !player.on_ground {
        1.0
    } else if player.is_crouching {
        tuning.crouch_multiplier
    } else if player.is_running {
        tuning.run_multiplier
    } else {
        1.0
    }
}

/// Translate by `delta`, undoing it if the column ends up inside an obstacle
fn try_move(player: &mut Player, delta: Vec3, obstacles: &[Obstacle], tuning: &Tuning) -> bool {
    if delta == Vec3::ZERO {
        return false;
    }
    let before = player.position;
    player.position += delta;
    if intersects_any(&player.column(tuning), obstacles) {
        player.position = before;
        return true;
    }
    false
}

/// Unit (strafe, forward) direction of the held movement keys, zero when idle
/// or when opposing keys cancel out
fn input_direction(input: &FrameInput) -> Vec2 {
    let axis = |positive: bool, negative: bool| positive as i8 as f32 - negative as i8 as f32;
    Vec2::new(axis(input.right, input.left), axis(input.forward, input.back)).normalize_or_zero()
}

/// Advance the player's planar state by `dt`
pub fn resolve_horizontal(
    player: &mut Player,
    input: &FrameInput,
    obstacles: &[Obstacle],
    dt: f32,
    tuning: &Tuning,
) -> HorizontalOutcome {
    let mut outcome = HorizontalOutcome::default();

    player.velocity -= player.velocity * (tuning.damping * dt).min(1.0);

    let accel = tuning.base_speed * speed_multiplier(player, tuning) * tuning.damping * dt;
    player.velocity += input_direction(input) * accel;

    let strafe = input.look.right * player.velocity.x * dt;
    outcome.strafe_blocked = try_move(player, strafe, obstacles, tuning);

    let forward = input.look.forward * player.velocity.y * dt;
    outcome.forward_blocked = try_move(player, forward, obstacles, tuning);

    let limit = tuning.arena_limit();
    let clamped_x = player.position.x.clamp(-limit, limit);
    let clamped_z = player.position.z.clamp(-limit, limit);
    outcome.clamped = clamped_x != player.position.x || clamped_z != player.position.z;
    player.position.x = clamped_x;
    player.position.z = clamped_z;

    outcome
}
