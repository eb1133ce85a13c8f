// Camera module for Starfield-3D

use crate::math::Transform;
use glam::{Mat4, Vec3};

/// Perspective camera looking down its local -Z axis.
///
/// The projection parameters are fixed at creation; only the transform moves.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub transform: Transform,
    fov_degrees: f32,
    aspect: f32,
    near: f32,
    far: f32,
}

impl PerspectiveCamera {
    pub fn new(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            transform: Transform::identity(),
            fov_degrees,
            aspect,
            near,
            far,
        }
    }

    pub fn fov_degrees(&self) -> f32 {
        self.fov_degrees
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    /// Only used when the window is configured to follow resizes.
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    pub fn view_matrix(&self) -> Mat4 {
        (Mat4::from_translation(self.transform.position) * self.transform.rotation_matrix()).inverse()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
