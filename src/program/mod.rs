//! Deferred Shader Programs
//!
//! A program bundles a render pipeline with the bind group layouts its
//! shader declares. Both programs are specialised for one
//! [`GBufferLayout`](crate::gbuffer::GBufferLayout) and must be rebuilt if
//! the layout changes.
//!
//! | Program              | Group 0                  | Group 1                     |
//! |----------------------|--------------------------|-----------------------------|
//! | [`GeometryProgram`]  | camera                   | object (dynamic offset)     |
//! | [`LightingProgram`]  | camera + lighting        | G-buffer textures + depth   |

mod geometry;
mod lighting;

pub use geometry::GeometryProgram;
pub use lighting::LightingProgram;

use std::num::NonZeroU64;

fn uniform_entry<T>(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: NonZeroU64::new(std::mem::size_of::<T>() as u64),
        },
        count: None,
    }
}
