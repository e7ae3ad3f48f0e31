//! First-person look control (yaw/pitch from pointer-locked mouse movement)

use std::f32::consts::FRAC_PI_2;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Keeps the view from flipping over the poles
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;

/// Camera-relative planar movement axes (unit length, y = 0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LookBasis {
    pub forward: Vec3,
    pub right: Vec3,
}

impl Default for LookBasis {
    fn default() -> Self {
        Self::from_yaw(0.0)
    }
}

impl LookBasis {
    /// Yaw 0 looks down -Z with +X to the right
    pub fn from_yaw(yaw: f32) -> Self {
        let (sin, cos) = yaw.sin_cos();
        Self {
            forward: Vec3::new(-sin, 0.0, -cos),
            right: Vec3::new(cos, 0.0, -sin),
        }
    }
}

/// Orientation owned by the look subsystem; the simulation only reads it
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LookControl {
    pub yaw: f32,
    pub pitch: f32,
}

impl LookControl {
    /// Apply a pointer movement in pixels
    pub fn apply_mouse_delta(&mut self, dx: f32, dy: f32, sensitivity: f32, invert_y: bool) {
        self.yaw = crate::normalize_angle(self.yaw - dx * sensitivity);
        let dy = if invert_y { -dy } else { dy };
        self.pitch = (self.pitch - dy * sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    #[inline]
    pub fn basis(&self) -> LookBasis {
        LookBasis::from_yaw(self.yaw)
    }

    /// Full 3D view direction
    pub fn view_direction(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(-sy * cp, sp, -cy * cp)
    }
}
