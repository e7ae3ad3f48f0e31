//! Shape generation and flat shading
//!
//! Shapes come out as world-space polygons (`Face`) with an outward normal.
//! Large faces are split into tiles so per-face fog and depth sorting stay
//! reasonable on the long walls and the ground plane.

use std::f32::consts::PI;

use glam::{Mat4, Vec3};

use super::vertex::colors;
use crate::rgb;
use crate::sim::daynight::Lighting;

/// Subdivision cap per face axis
const MAX_TILES_PER_AXIS: u32 = 64;

/// Sun position; the directional light shines from here toward the origin
const SUN_POSITION: Vec3 = Vec3::new(20.0, 30.0, 20.0);

const TORCH_INTENSITY: f32 = 1.6;
/// Distance at which the torch contributes nothing
const TORCH_RANGE: f32 = 18.0;

/// Convex planar polygon with an outward normal
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub points: Vec<Vec3>,
    pub normal: Vec3,
}

impl Face {
    pub fn center(&self) -> Vec3 {
        if self.points.is_empty() {
            return Vec3::ZERO;
        }
        self.points.iter().copied().sum::<Vec3>() / self.points.len() as f32
    }

    /// Whether the outward side faces `eye`
    #[inline]
    pub fn faces(&self, eye: Vec3) -> bool {
        self.points
            .first()
            .is_some_and(|p| self.normal.dot(eye - *p) > 0.0)
    }
}

/// Split a parallelogram `a, b, c, d` (a->b and a->d are its edges) into tiles
/// no longer than `max_edge` along either edge
pub fn quad(corners: [Vec3; 4], normal: Vec3, max_edge: f32) -> Vec<Face> {
    let [a, b, _, d] = corners;
    let u = b - a;
    let v = d - a;
    let steps = |len: f32| -> u32 {
        if max_edge <= 0.0 {
            1
        } else {
            ((len / max_edge).ceil() as u32).clamp(1, MAX_TILES_PER_AXIS)
        }
    };
    let nu = steps(u.length());
    let nv = steps(v.length());

    let at = |i: u32, j: u32| a + u * (i as f32 / nu as f32) + v * (j as f32 / nv as f32);

    let mut faces = Vec::with_capacity((nu * nv) as usize);
    for j in 0..nv {
        for i in 0..nu {
            faces.push(Face {
                points: vec![at(i, j), at(i + 1, j), at(i + 1, j + 1), at(i, j + 1)],
                normal,
            });
        }
    }
    faces
}

/// (normal, u, v) per box side with u x v = normal
const BOX_SIDES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::Y, Vec3::Z),
    (Vec3::NEG_X, Vec3::Z, Vec3::Y),
    (Vec3::Y, Vec3::Z, Vec3::X),
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    (Vec3::Z, Vec3::X, Vec3::Y),
    (Vec3::NEG_Z, Vec3::Y, Vec3::X),
];

/// Generate the faces of a box with `half_extents`, placed by `transform`
pub fn cuboid(transform: &Mat4, half_extents: Vec3, max_edge: f32) -> Vec<Face> {
    let mut faces = Vec::new();
    for (n, u, v) in BOX_SIDES {
        let hn = (n.abs() * half_extents).element_sum();
        let hu = (u * half_extents).element_sum();
        let hv = (v * half_extents).element_sum();
        let corner = |su: f32, sv: f32| transform.transform_point3(n * hn + u * (hu * su) + v * (hv * sv));
        let normal = transform.transform_vector3(n).normalize_or_zero();
        faces.extend(quad(
            [corner(-1.0, -1.0), corner(1.0, -1.0), corner(1.0, 1.0), corner(-1.0, 1.0)],
            normal,
            max_edge,
        ));
    }
    faces
}

/// Generate the faces of an upright cylinder (sides and both caps)
pub fn cylinder(center: Vec3, radius: f32, half_height: f32, segments: u32) -> Vec<Face> {
    let segments = segments.max(3);
    let rim = |i: u32, y: f32| {
        let theta = (i as f32 / segments as f32) * 2.0 * PI;
        center + Vec3::new(radius * theta.cos(), y, radius * theta.sin())
    };

    let mut faces = Vec::with_capacity(segments as usize + 2);
    for i in 0..segments {
        let mid = ((i as f32 + 0.5) / segments as f32) * 2.0 * PI;
        faces.push(Face {
            points: vec![
                rim(i, -half_height),
                rim(i, half_height),
                rim(i + 1, half_height),
                rim(i + 1, -half_height),
            ],
            normal: Vec3::new(mid.cos(), 0.0, mid.sin()),
        });
    }
    faces.push(Face {
        points: (0..segments).rev().map(|i| rim(i, half_height)).collect(),
        normal: Vec3::Y,
    });
    faces.push(Face {
        points: (0..segments).map(|i| rim(i, -half_height)).collect(),
        normal: Vec3::NEG_Y,
    });
    faces
}

/// Generate the ground plane as square tiles at height `y`
pub fn ground(half_size: f32, y: f32, tile: f32) -> Vec<Face> {
    let h = half_size;
    quad(
        [
            Vec3::new(-h, y, -h),
            Vec3::new(-h, y, h),
            Vec3::new(h, y, h),
            Vec3::new(h, y, -h),
        ],
        Vec3::Y,
        tile,
    )
}

/// Flat per-face lighting: ambient + directional + optional torch, then fog
#[derive(Debug, Clone, Copy)]
pub struct Shading {
    lighting: Lighting,
    eye: Vec3,
    torch_on: bool,
    fog_start: f32,
    fog_end: f32,
}

impl Shading {
    pub fn new(lighting: Lighting, eye: Vec3, torch_on: bool, fog_start: f32, fog_end: f32) -> Self {
        Self {
            lighting,
            eye,
            torch_on,
            fog_start,
            fog_end: fog_end.max(fog_start + f32::EPSILON),
        }
    }

    /// Shaded RGBA for a face of base color `base`
    pub fn shade(&self, base: Vec3, face: &Face) -> [f32; 4] {
        let l = &self.lighting;
        let center = face.center();
        let sun = SUN_POSITION.normalize();

        let mut light = l.ambient_color * l.ambient_intensity
            + l.directional_color * (l.directional_intensity * face.normal.dot(sun).max(0.0));

        let to_eye = self.eye - center;
        let distance = to_eye.length();
        if self.torch_on && distance < TORCH_RANGE && distance > f32::EPSILON {
            let facing = face.normal.dot(to_eye / distance).max(0.0);
            let falloff = 1.0 - distance / TORCH_RANGE;
            light += rgb(colors::TORCH) * (TORCH_INTENSITY * facing * falloff * falloff);
        }

        let lit = (base * light).min(Vec3::ONE);
        let fog = ((distance - self.fog_start) / (self.fog_end - self.fog_start)).clamp(0.0, 1.0);
        let c = lit.lerp(l.fog, fog);
        [c.x, c.y, c.z, 1.0]
    }
}
