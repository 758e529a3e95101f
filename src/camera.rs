use glam::{Mat4, UVec2, Vec3};

use crate::uniforms::CameraUniforms;

/// Right-handed perspective camera looking at a target point.
///
/// Projections map view depth to `[0, 1]` (wgpu clip space), with the near
/// plane at 0 so the G-buffer depth clears to 1.0 at the far plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 2.0, 6.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: 60f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 200.0,
        }
    }
}

impl Camera {
    #[must_use]
    pub fn look_at(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            target,
            ..Default::default()
        }
    }

    /// Updates the aspect ratio from a render size. Zero sizes are ignored.
    pub fn set_aspect_from_size(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    #[must_use]
    pub fn uniforms(&self, viewport: UVec2) -> CameraUniforms {
        CameraUniforms::new(
            self.view_matrix(),
            self.projection_matrix(),
            self.position,
            viewport,
            self.near,
            self.far,
        )
    }
}
