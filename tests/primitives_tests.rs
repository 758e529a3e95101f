//! Primitive Mesh Tests
//!
//! Tests for:
//! - Vertex / index counts of box, plane and sphere
//! - Bounding boxes
//! - Outward-facing counter-clockwise winding (back-face culling)
//! - Unit-length normals

use glam::Vec3;

use umbra::mesh::{MeshData, MeshVertex};
use umbra::primitives::{create_box, create_plane, create_sphere};

const EPSILON: f32 = 1e-4;

fn position(mesh: &MeshData, index: u32) -> Vec3 {
    Vec3::from_array(mesh.vertices[index as usize].position)
}

/// Geometric normal of every triangle, from its winding.
fn face_normals(mesh: &MeshData) -> Vec<(Vec3, Vec3)> {
    mesh.indices
        .chunks_exact(3)
        .map(|tri| {
            let (a, b, c) = (position(mesh, tri[0]), position(mesh, tri[1]), position(mesh, tri[2]));
            let centroid = (a + b + c) / 3.0;
            ((b - a).cross(c - a), centroid)
        })
        .collect()
}

fn assert_unit_normals(mesh: &MeshData) {
    for v in &mesh.vertices {
        let len = Vec3::from_array(v.normal).length();
        assert!((len - 1.0).abs() < EPSILON, "normal length {len}");
    }
}

// ============================================================================
// Box
// ============================================================================

#[test]
fn box_counts() {
    let mesh = create_box(1.0, 2.0, 3.0);
    assert_eq!(mesh.vertices.len(), 24);
    assert_eq!(mesh.indices.len(), 36);
    assert_eq!(mesh.triangle_count(), 12);
    assert!(mesh.is_valid());
}

#[test]
fn box_bounds_match_dimensions() {
    let bounds = create_box(1.0, 2.0, 3.0).bounding_box().unwrap();
    assert!(bounds.size().abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), EPSILON));
    assert!(bounds.center().abs_diff_eq(Vec3::ZERO, EPSILON));
}

#[test]
fn box_faces_wind_outward() {
    let mesh = create_box(2.0, 1.0, 0.5);
    for (normal, centroid) in face_normals(&mesh) {
        assert!(normal.dot(centroid) > 0.0, "inward triangle at {centroid:?}");
    }
}

#[test]
fn box_winding_agrees_with_vertex_normals() {
    let mesh = create_box(1.0, 1.0, 1.0);
    for tri in mesh.indices.chunks_exact(3) {
        let (a, b, c) = (position(&mesh, tri[0]), position(&mesh, tri[1]), position(&mesh, tri[2]));
        let geometric = (b - a).cross(c - a).normalize();
        let shading = Vec3::from_array(mesh.vertices[tri[0] as usize].normal);
        assert!(geometric.abs_diff_eq(shading, EPSILON));
    }
    assert_unit_normals(&mesh);
}

// ============================================================================
// Plane
// ============================================================================

#[test]
fn plane_counts() {
    let mesh = create_plane(10.0, 10.0, 4, 2);
    assert_eq!(mesh.vertices.len(), 5 * 3);
    assert_eq!(mesh.triangle_count(), 4 * 2 * 2);
    assert!(mesh.is_valid());
}

#[test]
fn plane_zero_segments_become_one() {
    let mesh = create_plane(1.0, 1.0, 0, 0);
    assert_eq!(mesh.vertices.len(), 4);
    assert_eq!(mesh.triangle_count(), 2);
}

#[test]
fn plane_faces_up() {
    let mesh = create_plane(4.0, 2.0, 3, 3);
    for (normal, _) in face_normals(&mesh) {
        assert!(normal.normalize().abs_diff_eq(Vec3::Y, EPSILON));
    }
    let bounds = mesh.bounding_box().unwrap();
    assert!(bounds.size().abs_diff_eq(Vec3::new(4.0, 0.0, 2.0), EPSILON));
}

// ============================================================================
// Sphere
// ============================================================================

#[test]
fn sphere_counts_skip_pole_triangles() {
    let mesh = create_sphere(1.0, 16, 8);
    assert_eq!(mesh.vertices.len(), 17 * 9);
    // two triangles per quad, minus one per quad on each pole row
    assert_eq!(mesh.triangle_count(), 16 * 8 * 2 - 2 * 16);
    assert!(mesh.is_valid());
}

#[test]
fn sphere_vertices_lie_on_radius() {
    let mesh = create_sphere(2.5, 12, 6);
    for v in &mesh.vertices {
        let r = Vec3::from_array(v.position).length();
        assert!((r - 2.5).abs() < EPSILON, "radius {r}");
    }
    assert_unit_normals(&mesh);
}

#[test]
fn sphere_faces_wind_outward() {
    let mesh = create_sphere(1.0, 24, 12);
    for (normal, centroid) in face_normals(&mesh) {
        assert!(normal.dot(centroid) > 0.0, "inward triangle at {centroid:?}");
    }
}

#[test]
fn sphere_segments_are_clamped() {
    let mesh = create_sphere(1.0, 0, 0);
    assert_eq!(mesh.vertices.len(), 4 * 3);
    assert!(mesh.is_valid());
}

// ============================================================================
// MeshData
// ============================================================================

#[test]
fn empty_mesh_has_no_bounds() {
    assert!(MeshData::default().bounding_box().is_none());
    assert!(MeshData::default().is_valid());
}

#[test]
fn out_of_range_index_is_invalid() {
    let vertex = MeshVertex::new([0.0; 3], [0.0, 1.0, 0.0], [0.0; 2]);
    let mesh = MeshData::new(vec![vertex; 3], vec![0, 1, 3]);
    assert!(!mesh.is_valid());

    let partial = MeshData::new(vec![vertex; 3], vec![0, 1]);
    assert!(!partial.is_valid());
}

#[test]
fn mesh_vertex_layout_matches_struct() {
    let layout = MeshVertex::layout();
    assert_eq!(layout.array_stride, 32);
    let offsets: Vec<_> = layout.attributes.iter().map(|a| a.offset).collect();
    assert_eq!(offsets, vec![0, 12, 24]);
}
