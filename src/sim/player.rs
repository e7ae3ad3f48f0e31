//! The player body: position, velocities, stance and what it stands on

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::geometry::{Aabb, Footprint};
use crate::consts::{COLLISION_SKIN, GROUND_Y};
use crate::planar;
use crate::tuning::Tuning;

/// Horizontal surface currently supporting the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Surface {
    /// The infinite walkable ground plane
    Ground,
    /// Top of the obstacle with this id
    Platform { obstacle: u32 },
}

/// The sole simulated actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Eye (camera) position in world space
    pub position: Vec3,
    /// Planar velocity in the camera frame: `x` strafes right, `y` moves forward
    pub velocity: Vec2,
    pub vertical_velocity: f32,
    pub on_ground: bool,
    /// Y of the surface that last supported the player
    pub last_surface_y: f32,
    pub support: Surface,
    pub is_crouching: bool,
    pub is_running: bool,
    pub air_jumps_used: u32,
}

impl Player {
    /// Standing on the ground at the given planar position
    pub fn spawn(x: f32, z: f32, tuning: &Tuning) -> Self {
        Self {
            position: Vec3::new(x, GROUND_Y + tuning.eye_height, z),
            velocity: Vec2::ZERO,
            vertical_velocity: 0.0,
            on_ground: true,
            last_surface_y: GROUND_Y,
            support: Surface::Ground,
            is_crouching: false,
            is_running: false,
            air_jumps_used: 0,
        }
    }

    #[inline]
    pub fn eye_height(&self, tuning: &Tuning) -> f32 {
        tuning.eye_height_for(self.is_crouching)
    }

    #[inline]
    pub fn feet_y(&self, tuning: &Tuning) -> f32 {
        self.position.y - self.eye_height(tuning)
    }

    /// Horizontal extent of the collision column
    #[inline]
    pub fn footprint(&self, tuning: &Tuning) -> Footprint {
        Footprint::around(planar(self.position), tuning.player_radius)
    }

    /// Vertical collision column from the feet to just above the eye
    pub fn column(&self, tuning: &Tuning) -> Aabb {
        let r = tuning.player_radius;
        Aabb {
            min: Vec3::new(
                self.position.x - r,
                self.feet_y(tuning) + COLLISION_SKIN,
                self.position.z - r,
            ),
            max: Vec3::new(self.position.x + r, self.position.y + tuning.headroom, self.position.z + r),
        }
    }

    /// Change stance keeping the feet where they are
    pub fn set_crouching(&mut self, crouching: bool, tuning: &Tuning) {
        if self.is_crouching == crouching {
            return;
        }
        let feet = if self.on_ground { self.last_surface_y } else { self.feet_y(tuning) };
        self.is_crouching = crouching;
        self.position.y = feet + self.eye_height(tuning);
    }

    /// Rest on `surface` whose top is at `surface_y`
    pub fn settle(&mut self, surface: Surface, surface_y: f32, tuning: &Tuning) {
        self.support = surface;
        self.last_surface_y = surface_y;
        self.position.y = surface_y + self.eye_height(tuning);
        self.vertical_velocity = 0.0;
        self.on_ground = true;
        self.air_jumps_used = 0;
    }
}
