//! Full-Screen Quad
//!
//! Screen-aligned rectangle drawn once per frame by the lighting pass to run
//! the lighting fragment shader over every pixel of the viewport.
//!
//! ```text
//!  3 ────── 2      NDC (-1,1) ── (1,1)     uv (0,0) ── (1,0)
//!  │  ╲     │
//!  │    ╲   │
//!  0 ────── 1      NDC (-1,-1) ─ (1,-1)    uv (0,1) ── (1,1)
//! ```
//!
//! UVs follow the wgpu texture convention (origin top-left), so `uv`
//! addresses the G-buffer directly.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

pub const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { position: [-1.0, -1.0], uv: [0.0, 1.0] },
    QuadVertex { position: [1.0, -1.0], uv: [1.0, 1.0] },
    QuadVertex { position: [1.0, 1.0], uv: [1.0, 0.0] },
    QuadVertex { position: [-1.0, 1.0], uv: [0.0, 0.0] },
];

/// Two counter-clockwise triangles.
pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 2, 3, 0];

const QUAD_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

/// GPU buffers of the full-screen quad.
pub struct FullscreenQuad {
    vertex_buffer: wgpu::Buffer,
    element_buffer: wgpu::Buffer,
}

impl FullscreenQuad {
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Fullscreen Quad Vertices"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let element_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Fullscreen Quad Indices"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            element_buffer,
        }
    }

    #[must_use]
    pub fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &QUAD_ATTRIBUTES,
        }
    }

    /// Binds the quad buffers on `pass` and draws it once.
    ///
    /// The caller sets the pipeline and bind groups beforehand.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.element_buffer.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
    }
}
