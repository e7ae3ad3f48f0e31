//! First-person camera: CPU-side view and projection

use glam::{Mat4, Vec3, Vec4};

use crate::settings::Settings;

/// Near clip plane distance
pub const NEAR_PLANE: f32 = 0.1;

#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub eye: Vec3,
    view: Mat4,
    view_proj: Mat4,
}

impl Camera {
    pub fn new(eye: Vec3, direction: Vec3, aspect: f32, settings: &Settings) -> Self {
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        let view = Mat4::look_to_rh(eye, direction, Vec3::Y);
        let proj = Mat4::perspective_rh(settings.fov_radians(), aspect, NEAR_PLANE, settings.quality.view_distance());
        Self {
            eye,
            view,
            view_proj: proj * view,
        }
    }

    /// World point to homogeneous clip coordinates
    #[inline]
    pub fn project(&self, point: Vec3) -> Vec4 {
        self.view_proj * point.extend(1.0)
    }

    /// Camera space to world space (for view-model geometry like the held weapon)
    #[inline]
    pub fn world_from_view(&self) -> Mat4 {
        self.view.inverse()
    }

    /// True when the point lies behind the near plane
    #[inline]
    pub fn is_behind(&self, point: Vec3) -> bool {
        self.view.transform_point3(point).z > -NEAR_PLANE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(Vec3::new(0.0, 1.7, 5.0), Vec3::NEG_Z, 16.0 / 9.0, &Settings::default())
    }

    #[test]
    fn test_point_ahead_projects_to_center() {
        let clip = camera().project(Vec3::new(0.0, 1.7, -5.0));
        assert!(clip.w > 0.0);
        assert!((clip.x / clip.w).abs() < 1e-5);
        assert!((clip.y / clip.w).abs() < 1e-5);
        let depth = clip.z / clip.w;
        assert!((0.0..=1.0).contains(&depth));
    }

    #[test]
    fn test_point_behind() {
        let cam = camera();
        assert!(cam.is_behind(Vec3::new(0.0, 1.7, 10.0)));
        assert!(!cam.is_behind(Vec3::new(0.0, 1.7, 0.0)));
        assert!(cam.project(Vec3::new(0.0, 1.7, 10.0)).w < 0.0);
    }

    #[test]
    fn test_view_model_follows_eye() {
        let cam = camera();
        let p = cam.world_from_view().transform_point3(Vec3::new(0.0, 0.0, -1.0));
        assert!((p - Vec3::new(0.0, 1.7, 4.0)).length() < 1e-4);
    }

    #[test]
    fn test_bad_aspect_is_replaced() {
        let cam = Camera::new(Vec3::ZERO, Vec3::NEG_Z, 0.0, &Settings::default());
        assert!(cam.project(Vec3::new(0.0, 0.0, -3.0)).is_finite());
    }
}
