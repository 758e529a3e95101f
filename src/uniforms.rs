//! GPU uniform layouts shared by the geometry and lighting programs.
//!
//! Every struct here mirrors a WGSL struct in `src/shaders`; field order and
//! padding must stay in sync with the shader side.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, UVec2, Vec3, Vec4};

use crate::material::Material;

/// 3x3 matrix for uniform buffers, matching WGSL `mat3x3<f32>`.
///
/// Each column is padded to 16 bytes; the fourth float is ignored.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Mat3Uniform {
    pub cols: [Vec4; 3],
}

impl Mat3Uniform {
    pub const IDENTITY: Self = Self {
        cols: [
            Vec4::new(1.0, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 1.0, 0.0, 0.0),
            Vec4::new(0.0, 0.0, 1.0, 0.0),
        ],
    };

    #[must_use]
    pub fn from_mat3(m: Mat3) -> Self {
        Self {
            cols: [m.x_axis.extend(0.0), m.y_axis.extend(0.0), m.z_axis.extend(0.0)],
        }
    }

    /// Inverse-transpose of the upper 3x3 of `model`, for transforming
    /// normals under non-uniform scale.
    #[must_use]
    pub fn normal_matrix(model: Mat4) -> Self {
        Self::from_mat3(Mat3::from_mat4(model).inverse().transpose())
    }

    #[must_use]
    pub fn to_mat3(&self) -> Mat3 {
        Mat3::from_cols(
            self.cols[0].truncate(),
            self.cols[1].truncate(),
            self.cols[2].truncate(),
        )
    }
}

/// Per-frame camera data (group 0, binding 0 in both programs).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CameraUniforms {
    pub view_projection: Mat4,
    pub view: Mat4,
    pub inverse_view_projection: Mat4,
    /// xyz = eye position, w = 1
    pub position: Vec4,
    /// (width, height, 1 / width, 1 / height)
    pub viewport: Vec4,
    /// (near, far, 0, 0)
    pub depth_range: Vec4,
}

impl Default for CameraUniforms {
    fn default() -> Self {
        Self {
            view_projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            inverse_view_projection: Mat4::IDENTITY,
            position: Vec4::W,
            viewport: Vec4::new(1.0, 1.0, 1.0, 1.0),
            depth_range: Vec4::new(0.1, 100.0, 0.0, 0.0),
        }
    }
}

impl CameraUniforms {
    #[must_use]
    pub fn new(
        view: Mat4,
        projection: Mat4,
        eye: Vec3,
        viewport: UVec2,
        near: f32,
        far: f32,
    ) -> Self {
        let view_projection = projection * view;
        let size = viewport.max(UVec2::ONE).as_vec2();
        Self {
            view_projection,
            view,
            inverse_view_projection: view_projection.inverse(),
            position: eye.extend(1.0),
            viewport: Vec4::new(size.x, size.y, 1.0 / size.x, 1.0 / size.y),
            depth_range: Vec4::new(near, far, 0.0, 0.0),
        }
    }
}

/// Per-draw data read through a dynamic offset (group 1 of the geometry
/// program). Each instance occupies exactly 256 bytes, the minimum uniform
/// offset alignment wgpu guarantees.
#[repr(C, align(256))]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct ObjectUniforms {
    pub model: Mat4,         // 64
    pub normal_matrix: Mat3Uniform, // 48
    /// rgb = albedo, a = 1
    pub albedo: Vec4, // 16
    /// rgb = specular color, a = shininess / 255
    pub specular: Vec4, // 16
    /// rgb = emitted radiance, a unused
    pub emissive: Vec4, // 16
    pub _padding: [f32; 24], // 96 → 256
}

impl ObjectUniforms {
    #[must_use]
    pub fn new(model: Mat4, material: &Material) -> Self {
        Self {
            model,
            normal_matrix: Mat3Uniform::normal_matrix(model),
            albedo: material.albedo.extend(1.0),
            specular: material.specular.extend(material.packed_shininess()),
            emissive: material.emissive.extend(0.0),
            _padding: [0.0; 24],
        }
    }
}
