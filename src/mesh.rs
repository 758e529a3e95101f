//! Mesh data for the geometry pass.
//!
//! [`MeshData`] is the CPU-side description (interleaved vertices plus
//! indices); [`GpuMesh`] is its uploaded form.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

const MESH_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

impl MeshVertex {
    #[must_use]
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }

    #[must_use]
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &MESH_ATTRIBUTES,
        }
    }
}

/// Axis-aligned bounds of a mesh in object space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Indexed triangle list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    #[must_use]
    pub fn new(vertices: Vec<MeshVertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns `None` for an empty mesh.
    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut iter = self.vertices.iter().map(|v| Vec3::from_array(v.position));
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(BoundingBox { min, max })
    }

    /// Returns `true` when every index addresses an existing vertex and the
    /// index count forms whole triangles.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.indices.len() % 3 == 0
            && self
                .indices
                .iter()
                .all(|&i| (i as usize) < self.vertices.len())
    }

    /// Uploads the mesh. Empty meshes upload fine and draw nothing.
    pub fn upload(&self, device: &wgpu::Device, label: &str) -> GpuMesh {
        GpuMesh::new(device, self, label)
    }
}

/// Uploaded vertex and index buffers of a [`MeshData`].
pub struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    #[must_use]
    pub fn new(device: &wgpu::Device, data: &MeshData, label: &str) -> Self {
        if !data.is_valid() {
            log::warn!("Mesh '{label}' has out-of-range or partial triangle indices");
        }

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertices")),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Indices")),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
        }
    }

    #[inline]
    #[must_use]
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// `true` when there is nothing to draw.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index_count == 0 || self.vertex_buffer.size() == 0
    }

    pub(crate) fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        // wgpu rejects empty buffer slices.
        if self.is_empty() {
            return;
        }
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}
