//! Vertical motion: support checks, jumps, gravity and landings
//!
//! While standing, the eye is pinned to the supporting surface and support is
//! re-checked every frame against the player's footprint. While airborne,
//! gravity is integrated and the frame's feet travel is tested against every
//! platform top, then against the ground plane.

use glam::Vec2;

use super::geometry::{Footprint, Obstacle};
use super::player::{Player, Surface};
use crate::consts::GROUND_Y;
use crate::tuning::Tuning;

/// Platform tops closer than this count as the same surface
const SURFACE_MATCH_EPS: f32 = 1e-4;

/// What happened vertically this frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VerticalOutcome {
    /// `Some(is_air_jump)` if a jump impulse was applied
    pub jumped: Option<bool>,
    /// Surface touched down on
    pub landed: Option<Surface>,
    /// The supporting surface disappeared from under the feet
    pub left_support: bool,
}

/// Is `surface` at `surface_y` still under `footprint`?
fn still_supported(
    surface: Surface,
    surface_y: f32,
    footprint: &Footprint,
    obstacles: &[Obstacle],
    ground_half: f32,
) -> bool {
    match surface {
        Surface::Ground => footprint.overlaps(&Footprint::around(Vec2::ZERO, ground_half)),
        Surface::Platform { obstacle } => obstacles
            .iter()
            .find(|o| o.id == obstacle)
            .is_some_and(|o| (o.top() - surface_y).abs() < SURFACE_MATCH_EPS && o.footprint().overlaps(footprint)),
    }
}

/// Highest platform top crossed by feet moving from `prev_feet` to `curr_feet`.
/// Equal tops keep the earlier obstacle.
fn landing_platform<'a>(
    obstacles: &'a [Obstacle],
    footprint: &Footprint,
    prev_feet: f32,
    curr_feet: f32,
    eps: f32,
) -> Option<&'a Obstacle> {
    obstacles
        .iter()
        .filter(|o| {
            let top = o.top();
            prev_feet >= top - eps && curr_feet <= top + eps && o.footprint().overlaps(footprint)
        })
        .fold(None, |best: Option<&Obstacle>, o| match best {
            Some(b) if b.top() >= o.top() => Some(b),
            _ => Some(o),
        })
}

/// Advance the player's vertical state by `dt`
pub fn resolve_vertical(
    player: &mut Player,
    obstacles: &[Obstacle],
    ground_half: f32,
    jump: bool,
    dt: f32,
    tuning: &Tuning,
) -> VerticalOutcome {
    let mut outcome = VerticalOutcome::default();

    if player.on_ground {
        let footprint = player.footprint(tuning);
        if still_supported(player.support, player.last_surface_y, &footprint, obstacles, ground_half) {
            player.position.y = player.last_surface_y + player.eye_height(tuning);
            player.vertical_velocity = 0.0;
        } else {
            // Falls from the current height; the air-jump counter is untouched
            player.on_ground = false;
            outcome.left_support = true;
        }
    }

    if jump {
        if player.on_ground {
            player.vertical_velocity = tuning.jump_impulse;
            player.on_ground = false;
            player.air_jumps_used = 0;
            outcome.jumped = Some(false);
        } else if player.air_jumps_used < tuning.max_air_jumps {
            player.vertical_velocity = tuning.jump_impulse;
            player.air_jumps_used += 1;
            outcome.jumped = Some(true);
        }
    }

    if player.on_ground {
        return outcome;
    }

    let prev_feet = player.feet_y(tuning);
    if outcome.jumped.is_none() {
        player.vertical_velocity -= tuning.gravity * dt;
    }
    player.position.y += player.vertical_velocity * dt;

    if player.vertical_velocity >= 0.0 {
        return outcome;
    }

    let curr_feet = player.feet_y(tuning);
    let eps = tuning.landing_epsilon;
    let footprint = player.footprint(tuning);

    if let Some(platform) = landing_platform(obstacles, &footprint, prev_feet, curr_feet, eps) {
        let surface = Surface::Platform { obstacle: platform.id };
        player.settle(surface, platform.top(), tuning);
        outcome.landed = Some(surface);
    } else if curr_feet <= GROUND_Y + eps {
        player.settle(Surface::Ground, GROUND_Y, tuning);
        outcome.landed = Some(Surface::Ground);
    }

    outcome
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::sim::geometry::ObstacleKind;

    const DT: f32 = 1.0 / 60.0;
    const HALF: f32 = 50.0;

    fn platform(id: u32, x: f32, z: f32, size: Vec3) -> Obstacle {
        Obstacle::grounded_box(id, ObstacleKind::Building, x, z, size)
    }

    #[test]
    fn test_jump_leaves_ground_with_full_impulse() {
        let tuning = Tuning::default();
        let mut player = Player::spawn(0.0, 0.0, &tuning);

        let outcome = resolve_vertical(&mut player, &[], HALF, true, DT, &tuning);
        assert_eq!(outcome.jumped, Some(false));
        assert!(!player.on_ground);
        assert_eq!(player.vertical_velocity, tuning.jump_impulse);
        assert!(player.position.y > tuning.eye_height);
    }

    #[test]
    fn test_jump_arc_lands_back_on_ground() {
        let tuning = Tuning::default();
        let mut player = Player::spawn(0.0, 0.0, &tuning);
        resolve_vertical(&mut player, &[], HALF, true, DT, &tuning);
        player.air_jumps_used = 1;

        let mut frames = 0;
        while !player.on_ground {
            resolve_vertical(&mut player, &[], HALF, false, DT, &tuning);
            frames += 1;
            assert!(frames < 600, "never landed");
        }
        assert_eq!(player.position.y, tuning.eye_height);
        assert_eq!(player.vertical_velocity, 0.0);
        assert_eq!(player.air_jumps_used, 0);
        assert_eq!(player.support, Surface::Ground);
    }

    #[test]
    fn test_air_jumps_are_bounded() {
        let tuning = Tuning::default();
        let mut player = Player::spawn(0.0, 0.0, &tuning);
        resolve_vertical(&mut player, &[], HALF, true, DT, &tuning);

        let first = resolve_vertical(&mut player, &[], HALF, true, DT, &tuning);
        assert_eq!(first.jumped, Some(true));
        assert_eq!(player.air_jumps_used, 1);

        let vv = player.vertical_velocity;
        let second = resolve_vertical(&mut player, &[], HALF, true, DT, &tuning);
        assert_eq!(second.jumped, None);
        assert_eq!(player.air_jumps_used, 1);
        assert!(player.vertical_velocity < vv);
    }

    #[test]
    fn test_lands_on_platform_top() {
        let tuning = Tuning::default();
        let obstacles = [platform(3, 0.0, 0.0, Vec3::new(4.0, 2.0, 4.0))];
        let mut player = Player::spawn(0.0, 0.0, &tuning);
        player.on_ground = false;
        player.position.y = 4.0 + tuning.eye_height;

        let mut landed = None;
        for _ in 0..120 {
            let outcome = resolve_vertical(&mut player, &obstacles, HALF, false, DT, &tuning);
            if outcome.landed.is_some() {
                landed = outcome.landed;
                break;
            }
        }
        assert_eq!(landed, Some(Surface::Platform { obstacle: 3 }));
        assert_eq!(player.last_surface_y, 2.0);
        assert_eq!(player.position.y, 2.0 + tuning.eye_height);
    }

    #[test]
    fn test_walking_off_platform_starts_fall() {
        let tuning = Tuning::default();
        let obstacles = [platform(1, 0.0, 0.0, Vec3::new(4.0, 5.0, 4.0))];
        let mut player = Player::spawn(0.0, 0.0, &tuning);
        player.settle(Surface::Platform { obstacle: 1 }, 5.0, &tuning);

        let outcome = resolve_vertical(&mut player, &obstacles, HALF, false, DT, &tuning);
        assert!(!outcome.left_support);
        assert!(player.on_ground);

        // Footprint now clear of the platform edge at x = 2
        player.position.x = 2.6;
        player.air_jumps_used = 1;
        let outcome = resolve_vertical(&mut player, &obstacles, HALF, false, DT, &tuning);
        assert!(outcome.left_support);
        assert!(!player.on_ground);
        assert_eq!(player.air_jumps_used, 1);
        let start = 5.0 + tuning.eye_height;
        assert!(player.position.y < start && player.position.y > start - 0.1);
    }

    #[test]
    fn test_highest_crossed_top_wins() {
        let tuning = Tuning::default();
        let obstacles = [
            platform(1, 0.0, 0.0, Vec3::new(4.0, 3.0, 4.0)),
            platform(2, 0.5, 0.0, Vec3::new(4.0, 3.5, 4.0)),
        ];
        let mut player = Player::spawn(0.0, 0.0, &tuning);
        player.on_ground = false;
        player.position.y = 3.6 + tuning.eye_height;
        player.vertical_velocity = -60.0;

        let outcome = resolve_vertical(&mut player, &obstacles, HALF, false, DT, &tuning);
        assert_eq!(outcome.landed, Some(Surface::Platform { obstacle: 2 }));
        assert_eq!(player.last_surface_y, 3.5);
    }

    #[test]
    fn test_rising_player_does_not_land() {
        let tuning = Tuning::default();
        let obstacles = [platform(1, 0.0, 0.0, Vec3::new(4.0, 1.0, 4.0))];
        let mut player = Player::spawn(0.0, 0.0, &tuning);
        player.on_ground = false;
        player.position.y = 1.02 + tuning.eye_height;
        player.vertical_velocity = 5.0;
        let outcome = resolve_vertical(&mut player, &obstacles, HALF, false, DT, &tuning);
        assert_eq!(outcome.landed, None);
    }
}
