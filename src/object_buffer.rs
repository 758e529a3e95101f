//! Per-draw uniform storage for the geometry pass.
//!
//! All draws of a frame share one uniform buffer and one bind group; each
//! draw selects its [`ObjectUniforms`] slot through a dynamic offset.
//! When a frame submits more draws than the buffer holds, the buffer grows
//! to the next power of two and the bind group is rebuilt.

use std::num::NonZeroU64;

use crate::uniforms::ObjectUniforms;

/// Size of one slot in bytes.
pub const OBJECT_STRIDE: u64 = std::mem::size_of::<ObjectUniforms>() as u64;

/// Capacity needed to hold `required` slots starting from `current`.
///
/// Never shrinks; grows to the next power of two.
#[must_use]
pub fn grow_capacity(current: usize, required: usize) -> usize {
    if required <= current {
        current
    } else {
        required.next_power_of_two()
    }
}

/// Bind group layout of the per-draw group (one dynamic uniform).
#[must_use]
pub fn object_bind_group_layout_entry() -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: true,
            min_binding_size: NonZeroU64::new(OBJECT_STRIDE),
        },
        count: None,
    }
}

/// Growable dynamic uniform buffer of [`ObjectUniforms`].
pub struct ObjectBuffer {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    capacity: usize,
    len: usize,
}

impl ObjectBuffer {
    #[must_use]
    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (buffer, bind_group) = Self::create(device, layout, capacity);
        Self {
            buffer,
            bind_group,
            capacity,
            len: 0,
        }
    }

    fn create(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        capacity: usize,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Object Uniforms"),
            size: OBJECT_STRIDE * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Object BindGroup"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(OBJECT_STRIDE),
                }),
            }],
        });

        (buffer, bind_group)
    }

    /// Uploads this frame's objects, growing the buffer if needed.
    ///
    /// Returns `true` when the buffer was recreated.
    pub fn write(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        objects: &[ObjectUniforms],
    ) -> bool {
        self.len = objects.len();
        if objects.is_empty() {
            return false;
        }

        let capacity = grow_capacity(self.capacity, objects.len());
        let recreated = capacity != self.capacity;
        if recreated {
            log::info!(
                "Growing object uniform buffer from {} to {capacity} slots",
                self.capacity
            );
            self.buffer.destroy();
            let (buffer, bind_group) = Self::create(device, layout, capacity);
            self.buffer = buffer;
            self.bind_group = bind_group;
            self.capacity = capacity;
        }

        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(objects));
        recreated
    }

    /// Dynamic offset of slot `index`.
    #[inline]
    #[must_use]
    pub fn offset(index: usize) -> u32 {
        (index as u64 * OBJECT_STRIDE) as u32
    }

    #[inline]
    #[must_use]
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of objects written by the last [`write`](Self::write).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
