//! Collision geometry for static world objects
//!
//! Everything collides as an axis-aligned box. Cylinders keep their own shape
//! for rendering, but collision and support tests use their bounding box.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Strict overlap test: boxes that only share a face do not intersect
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Horizontal projection
    #[inline]
    pub fn footprint(&self) -> Footprint {
        Footprint {
            min: Vec2::new(self.min.x, self.min.z),
            max: Vec2::new(self.max.x, self.max.z),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

/// Horizontal (XZ) rectangle. `x` is world X, `y` is world Z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub min: Vec2,
    pub max: Vec2,
}

impl Footprint {
    /// Square footprint of half-size `half` centered on `center`
    pub fn around(center: Vec2, half: f32) -> Self {
        Self {
            min: center - Vec2::splat(half),
            max: center + Vec2::splat(half),
        }
    }

    /// Strict overlap (touching edges do not count)
    #[inline]
    pub fn overlaps(&self, other: &Footprint) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    pub fn expand(&self, margin: f32) -> Self {
        Self {
            min: self.min - Vec2::splat(margin),
            max: self.max + Vec2::splat(margin),
        }
    }
}

/// Bounding shape of an obstacle, relative to its center
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Box { half_extents: Vec3 },
    Cylinder { radius: f32, half_height: f32 },
}

impl Shape {
    /// Half extents of the shape's bounding box
    pub fn half_extents(&self) -> Vec3 {
        match *self {
            Shape::Box { half_extents } => half_extents,
            Shape::Cylinder { radius, half_height } => Vec3::new(radius, half_height, radius),
        }
    }
}

/// World bounding box of `shape` placed at `center`
pub fn bounds_at(shape: &Shape, center: Vec3) -> Aabb {
    Aabb::from_center_half_extents(center, shape.half_extents())
}

/// Horizontal footprint of `shape` placed at `center`
pub fn footprint_at(shape: &Shape, center: Vec3) -> Footprint {
    bounds_at(shape, center).footprint()
}

/// What an obstacle represents in the arena (affects rendering only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Wall,
    Building,
    Smokestack,
    Vehicle,
    Store,
    Crate,
}

/// A static collidable world object with a standable top
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    pub shape: Shape,
    pub center: Vec3,
    bounds: Aabb,
}

impl Obstacle {
    pub fn new(id: u32, kind: ObstacleKind, shape: Shape, center: Vec3) -> Self {
        Self {
            id,
            kind,
            shape,
            center,
            bounds: bounds_at(&shape, center),
        }
    }

    /// Box obstacle sitting on the ground plane, `size` is full width/height/depth
    pub fn grounded_box(id: u32, kind: ObstacleKind, x: f32, z: f32, size: Vec3) -> Self {
        let half = size * 0.5;
        Self::new(id, kind, Shape::Box { half_extents: half }, Vec3::new(x, half.y, z))
    }

    /// Cylinder obstacle sitting on the ground plane
    pub fn grounded_cylinder(id: u32, kind: ObstacleKind, x: f32, z: f32, radius: f32, height: f32) -> Self {
        let half_height = height * 0.5;
        Self::new(
            id,
            kind,
            Shape::Cylinder { radius, half_height },
            Vec3::new(x, half_height, z),
        )
    }

    #[inline]
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Height of the standable top surface
    #[inline]
    pub fn top(&self) -> f32 {
        self.bounds.max.y
    }

    #[inline]
    pub fn footprint(&self) -> Footprint {
        self.bounds.footprint()
    }
}

/// True if `volume` intersects any obstacle
pub fn intersects_any(volume: &Aabb, obstacles: &[Obstacle]) -> bool {
    obstacles.iter().any(|o| o.bounds().intersects(volume))
}
