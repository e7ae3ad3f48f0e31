//! Frame geometry from the simulation state
//!
//! Everything is shaded and projected on the CPU. Faces are drawn back to
//! front (painter's algorithm): the ground first, then obstacles and
//! power-ups sorted by distance, then the held weapon on top.

use std::cmp::Ordering;

use glam::{EulerRot, Mat4, Vec3};

use super::camera::Camera;
use super::shapes::{self, Face, Shading};
use super::vertex::{Vertex, colors};
use crate::consts::GROUND_Y;
use crate::rgb;
use crate::settings::Settings;
use crate::sim::combat::Weapon;
use crate::sim::geometry::{ObstacleKind, Shape};
use crate::sim::look::LookControl;
use crate::sim::pickup::{self, PowerUpKind};
use crate::sim::state::SimulationState;

/// Longest tile edge for ground and large box faces
const TILE_SIZE: f32 = 8.0;
/// Edge length of the floating power-up cubes
const POWER_UP_SIZE: f32 = 0.6;
/// Power-up spin rate (radians per simulated second)
const POWER_UP_SPIN: f32 = 1.5;

/// Everything the pipeline needs to draw one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameGeometry {
    pub clear_color: Vec3,
    pub vertices: Vec<Vertex>,
}

struct ShadedFace {
    depth: f32,
    color: [f32; 4],
    face: Face,
}

struct SceneBuilder {
    camera: Camera,
    shading: Shading,
    vertices: Vec<Vertex>,
}

impl SceneBuilder {
    fn shade_visible(&self, faces: Vec<Face>, base: Vec3, out: &mut Vec<ShadedFace>) {
        for face in faces {
            if !face.faces(self.camera.eye) || face.points.iter().all(|p| self.camera.is_behind(*p)) {
                continue;
            }
            out.push(ShadedFace {
                depth: (face.center() - self.camera.eye).length(),
                color: self.shading.shade(base, &face),
                face,
            });
        }
    }

    /// Sort far to near and emit as a triangle fan per face
    fn emit(&mut self, mut faces: Vec<ShadedFace>) {
        faces.sort_by(|a, b| b.depth.partial_cmp(&a.depth).unwrap_or(Ordering::Equal));
        for shaded in faces {
            let points: Vec<[f32; 4]> = shaded
                .face
                .points
                .iter()
                .map(|p| self.camera.project(*p).to_array())
                .collect();
            for i in 1..points.len().saturating_sub(1) {
                self.vertices.push(Vertex::new(points[0], shaded.color));
                self.vertices.push(Vertex::new(points[i], shaded.color));
                self.vertices.push(Vertex::new(points[i + 1], shaded.color));
            }
        }
    }
}

fn obstacle_color(kind: ObstacleKind) -> Vec3 {
    rgb(match kind {
        ObstacleKind::Wall => colors::WALL,
        ObstacleKind::Vehicle => colors::VEHICLE,
        ObstacleKind::Store => colors::STORE,
        ObstacleKind::Building | ObstacleKind::Smokestack | ObstacleKind::Crate => colors::OBSTACLE,
    })
}

fn power_up_color(kind: PowerUpKind) -> Vec3 {
    rgb(match kind {
        PowerUpKind::Gun1 => colors::POWER_UP_GUN1,
        PowerUpKind::Gun2 => colors::POWER_UP_GUN2,
        PowerUpKind::Sword => colors::POWER_UP_SWORD,
        PowerUpKind::Health => colors::POWER_UP_HEALTH,
        PowerUpKind::Invincibility => colors::POWER_UP_INVINCIBILITY,
    })
}

/// Weapon parts as (local center, half extents, color), in the weapon's own frame
fn weapon_parts(weapon: Weapon) -> Vec<(Vec3, Vec3, u32)> {
    match weapon {
        Weapon::Gun1 => vec![
            (Vec3::ZERO, Vec3::new(0.05, 0.07, 0.18), colors::GUN_BODY),
            (Vec3::new(0.0, 0.03, -0.28), Vec3::new(0.025, 0.025, 0.1), colors::GUN_BODY),
            (Vec3::new(0.0, -0.12, 0.1), Vec3::new(0.04, 0.09, 0.04), colors::HILT),
        ],
        Weapon::Gun2 => vec![
            (Vec3::ZERO, Vec3::new(0.06, 0.08, 0.3), colors::GUN_BODY),
            (Vec3::new(0.0, 0.03, -0.45), Vec3::new(0.03, 0.03, 0.16), colors::GUN_BODY),
            (Vec3::new(0.0, -0.12, 0.12), Vec3::new(0.04, 0.09, 0.05), colors::HILT),
            (Vec3::new(0.0, -0.02, 0.38), Vec3::new(0.05, 0.07, 0.1), colors::HILT),
        ],
        Weapon::Sword => vec![
            (Vec3::new(0.0, 0.5, 0.0), Vec3::new(0.03, 0.45, 0.008), colors::BLADE),
            (Vec3::new(0.0, 0.04, 0.0), Vec3::new(0.1, 0.02, 0.03), colors::HILT),
            (Vec3::new(0.0, -0.08, 0.0), Vec3::new(0.025, 0.1, 0.025), colors::HILT),
        ],
    }
}

/// Build the geometry for one frame. `aspect` is width / height of the surface.
pub fn build_scene(state: &SimulationState, look: &LookControl, aspect: f32, settings: &Settings) -> FrameGeometry {
    let lighting = state.day_night.lighting;
    let eye = state.camera_position();
    let camera = Camera::new(eye, look.view_direction(), aspect, settings);

    let (fog_start, fog_end) = settings.quality.fog_range();
    let ground_size = state.tuning.ground_size;
    let shading = Shading::new(lighting, eye, state.torch_on, fog_start * ground_size, fog_end * ground_size);

    let mut builder = SceneBuilder {
        camera,
        shading,
        vertices: Vec::new(),
    };

    // Ground
    let mut ground = Vec::new();
    builder.shade_visible(
        shapes::ground(state.world.ground_half_size, GROUND_Y, TILE_SIZE),
        rgb(colors::GROUND),
        &mut ground,
    );
    builder.emit(ground);

    // Obstacles and power-ups
    let mut props = Vec::new();
    let segments = settings.quality.cylinder_segments();
    for obstacle in &state.world.obstacles {
        let faces = match obstacle.shape {
            Shape::Box { half_extents } => {
                shapes::cuboid(&Mat4::from_translation(obstacle.center), half_extents, TILE_SIZE)
            }
            Shape::Cylinder { radius, half_height } => shapes::cylinder(obstacle.center, radius, half_height, segments),
        };
        builder.shade_visible(faces, obstacle_color(obstacle.kind), &mut props);
    }

    let spin = (state.clock as f32 * POWER_UP_SPIN) % std::f32::consts::TAU;
    for power_up in pickup::active(&state.world.power_ups) {
        let transform = Mat4::from_translation(power_up.position) * Mat4::from_rotation_y(spin);
        let faces = shapes::cuboid(&transform, Vec3::splat(POWER_UP_SIZE / 2.0), 0.0);
        builder.shade_visible(faces, power_up_color(power_up.kind), &mut props);
    }
    builder.emit(props);

    // Held weapon, in front of everything
    if let Some(weapon) = state.combat.equipped {
        let pose = state.combat.pose;
        let hand = builder.camera.world_from_view()
            * Mat4::from_translation(pose.offset)
            * Mat4::from_euler(EulerRot::XYZ, pose.rotation.x, pose.rotation.y, pose.rotation.z);

        let mut held = Vec::new();
        for (center, half_extents, color) in weapon_parts(weapon) {
            let faces = shapes::cuboid(&(hand * Mat4::from_translation(center)), half_extents, 0.0);
            builder.shade_visible(faces, rgb(color), &mut held);
        }
        builder.emit(held);
    }

    FrameGeometry {
        clear_color: lighting.background,
        vertices: builder.vertices,
    }
}
