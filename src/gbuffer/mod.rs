//! Geometry Buffer
//!
//! The [`GeometryBuffer`] owns the multiple-render-target framebuffer of the
//! deferred pipeline: one texture per [`GBufferTarget`] in its
//! [`GBufferLayout`], plus a depth texture.
//!
//! # Data Flow
//!
//! ```text
//! GeometryProgram ──writes──▶ GeometryBuffer ──reads──▶ LightingProgram
//!                              (color MRT + depth)        (textureLoad)
//! ```
//!
//! Every recreation (resize) bumps [`GeometryBuffer::generation`], which
//! consumers compare against to know when bind groups referencing the old
//! views must be rebuilt.

mod layout;

pub use layout::{
    GBufferLayout, GBufferTarget, GBufferTargetDesc, MAX_GBUFFER_TARGETS, is_depth_format,
    target_format_cost,
};

use smallvec::SmallVec;

use crate::errors::{Result, UmbraError};

/// Checks that a render size is non-zero and within the device's 2D
/// texture limit.
pub fn validate_render_size(width: u32, height: u32, max_dimension: u32) -> Result<()> {
    if width == 0 || height == 0 || width > max_dimension || height > max_dimension {
        return Err(UmbraError::InvalidRenderSize {
            width,
            height,
            max: max_dimension,
        });
    }
    Ok(())
}

struct TargetTexture {
    target: GBufferTarget,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

struct DepthTexture {
    texture: wgpu::Texture,
    /// Attachment view (all aspects).
    view: wgpu::TextureView,
    /// Depth-only view for sampling in the lighting pass.
    sample_view: wgpu::TextureView,
}

/// Multiple-render-target framebuffer written by the geometry pass.
pub struct GeometryBuffer {
    layout: GBufferLayout,
    width: u32,
    height: u32,
    targets: SmallVec<[TargetTexture; MAX_GBUFFER_TARGETS]>,
    depth: DepthTexture,
    generation: u64,
}

impl GeometryBuffer {
    /// Allocates every target of `layout` at `width` × `height`.
    pub fn new(device: &wgpu::Device, layout: GBufferLayout, width: u32, height: u32) -> Result<Self> {
        let limits = device.limits();
        layout.validate(&limits)?;
        validate_render_size(width, height, limits.max_texture_dimension_2d)?;

        let (targets, depth) = Self::create_textures(device, &layout, width, height);

        log::debug!(
            "Created G-buffer {width}x{height} with {} targets ({} bytes/sample)",
            layout.targets().len(),
            layout.bytes_per_sample()?,
        );

        Ok(Self {
            layout,
            width,
            height,
            targets,
            depth,
            generation: 0,
        })
    }

    /// Recreates all textures at the new size.
    ///
    /// A zero-sized request (minimised window) is ignored and returns
    /// `Ok(false)`, as does a request for the current size.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) -> Result<bool> {
        if width == 0 || height == 0 {
            log::debug!("Ignoring G-buffer resize to {width}x{height}");
            return Ok(false);
        }
        if width == self.width && height == self.height {
            return Ok(false);
        }
        validate_render_size(width, height, device.limits().max_texture_dimension_2d)?;

        let (targets, depth) = Self::create_textures(device, &self.layout, width, height);
        self.release();
        self.targets = targets;
        self.depth = depth;
        self.width = width;
        self.height = height;
        self.generation += 1;

        log::info!("G-buffer resized to {width}x{height}");
        Ok(true)
    }

    fn create_textures(
        device: &wgpu::Device,
        layout: &GBufferLayout,
        width: u32,
        height: u32,
    ) -> (SmallVec<[TargetTexture; MAX_GBUFFER_TARGETS]>, DepthTexture) {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let targets = layout
            .targets()
            .iter()
            .map(|desc| {
                let texture = device.create_texture(&wgpu::TextureDescriptor {
                    label: Some(desc.target.label()),
                    size,
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format: desc.format,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                        | wgpu::TextureUsages::TEXTURE_BINDING,
                    view_formats: &[],
                });
                let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
                TargetTexture {
                    target: desc.target,
                    texture,
                    view,
                }
            })
            .collect();

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("GBuffer Depth"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: layout.depth_format(),
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sample_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("GBuffer Depth Sample View"),
            aspect: wgpu::TextureAspect::DepthOnly,
            ..Default::default()
        });

        (
            targets,
            DepthTexture {
                texture,
                view,
                sample_view,
            },
        )
    }

    fn release(&self) {
        for target in &self.targets {
            target.texture.destroy();
        }
        self.depth.texture.destroy();
    }

    #[inline]
    #[must_use]
    pub fn layout(&self) -> &GBufferLayout {
        &self.layout
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Incremented on every recreation of the textures.
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// View of a color target, if the layout contains it.
    #[must_use]
    pub fn view(&self, target: GBufferTarget) -> Option<&wgpu::TextureView> {
        self.targets
            .iter()
            .find(|t| t.target == target)
            .map(|t| &t.view)
    }

    #[inline]
    #[must_use]
    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth.view
    }

    #[inline]
    #[must_use]
    pub fn depth_sample_view(&self) -> &wgpu::TextureView {
        &self.depth.sample_view
    }

    /// Color attachments in location order, cleared to transparent black.
    #[must_use]
    pub fn color_attachments(
        &self,
    ) -> SmallVec<[Option<wgpu::RenderPassColorAttachment<'_>>; MAX_GBUFFER_TARGETS]> {
        self.targets
            .iter()
            .map(|t| {
                Some(wgpu::RenderPassColorAttachment {
                    view: &t.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })
            })
            .collect()
    }

    /// Depth attachment cleared to the far plane.
    #[must_use]
    pub fn depth_attachment(&self) -> wgpu::RenderPassDepthStencilAttachment<'_> {
        let has_stencil = self.layout.depth_format().has_stencil_aspect();
        wgpu::RenderPassDepthStencilAttachment {
            view: &self.depth.view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: has_stencil.then_some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(0),
                store: wgpu::StoreOp::Discard,
            }),
        }
    }

    /// Bind group entries matching
    /// [`GBufferLayout::lighting_bind_group_layout_entries`].
    #[must_use]
    pub fn bind_group_entries(&self) -> Vec<wgpu::BindGroupEntry<'_>> {
        let mut entries: Vec<_> = self
            .targets
            .iter()
            .enumerate()
            .map(|(binding, t)| wgpu::BindGroupEntry {
                binding: binding as u32,
                resource: wgpu::BindingResource::TextureView(&t.view),
            })
            .collect();
        entries.push(wgpu::BindGroupEntry {
            binding: self.layout.depth_binding(),
            resource: wgpu::BindingResource::TextureView(&self.depth.sample_view),
        });
        entries
    }
}

impl Drop for GeometryBuffer {
    fn drop(&mut self) {
        self.release();
    }
}
