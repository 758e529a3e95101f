//! Procedural meshes.
//!
//! All primitives use counter-clockwise winding seen from outside, matching
//! the geometry program's back-face culling.

use std::f32::consts::PI;

use glam::Vec3;

use crate::mesh::{MeshData, MeshVertex};

/// Axis-aligned box centred on the origin, 4 vertices per face.
#[must_use]
pub fn create_box(width: f32, height: f32, depth: f32) -> MeshData {
    let half = Vec3::new(width, height, depth) * 0.5;

    // (normal, u axis, v axis) with u × v = normal
    let faces = [
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    ];
    let corners: [(f32, f32, [f32; 2]); 4] = [
        (-1.0, -1.0, [0.0, 1.0]),
        (1.0, -1.0, [1.0, 1.0]),
        (1.0, 1.0, [1.0, 0.0]),
        (-1.0, 1.0, [0.0, 0.0]),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, u, v) in faces {
        let base = vertices.len() as u32;
        for (su, sv, uv) in corners {
            let position = (normal + u * su + v * sv) * half;
            vertices.push(MeshVertex::new(position.to_array(), normal.to_array(), uv));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    MeshData::new(vertices, indices)
}

/// Ground plane in XZ facing +Y.
#[must_use]
pub fn create_plane(width: f32, depth: f32, segments_x: u32, segments_z: u32) -> MeshData {
    let segments_x = segments_x.max(1);
    let segments_z = segments_z.max(1);
    let stride = segments_x + 1;

    let mut vertices = Vec::with_capacity((stride * (segments_z + 1)) as usize);
    for iz in 0..=segments_z {
        let tz = iz as f32 / segments_z as f32;
        for ix in 0..=segments_x {
            let tx = ix as f32 / segments_x as f32;
            vertices.push(MeshVertex::new(
                [(tx - 0.5) * width, 0.0, (tz - 0.5) * depth],
                [0.0, 1.0, 0.0],
                [tx, tz],
            ));
        }
    }

    let mut indices = Vec::with_capacity((segments_x * segments_z * 6) as usize);
    for iz in 0..segments_z {
        for ix in 0..segments_x {
            let a = iz * stride + ix;
            let b = a + stride;
            let c = b + 1;
            let d = a + 1;
            indices.extend_from_slice(&[a, b, c, a, c, d]);
        }
    }

    MeshData::new(vertices, indices)
}

/// UV sphere centred on the origin.
///
/// Degenerate triangles at the poles are skipped.
#[must_use]
pub fn create_sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);
    let stride = width_segments + 1;

    let mut vertices = Vec::with_capacity((stride * (height_segments + 1)) as usize);
    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        let theta = v * PI;
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let phi = u * 2.0 * PI;
            let normal = Vec3::new(-phi.cos() * theta.sin(), theta.cos(), phi.sin() * theta.sin());
            vertices.push(MeshVertex::new(
                (normal * radius).to_array(),
                normal.to_array(),
                [u, v],
            ));
        }
    }

    let mut indices = Vec::new();
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * stride + ix + 1;
            let b = iy * stride + ix;
            let c = (iy + 1) * stride + ix;
            let d = (iy + 1) * stride + ix + 1;
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    MeshData::new(vertices, indices)
}
