use crate::errors::Result;
use crate::gbuffer::{GBufferLayout, GeometryBuffer};
use crate::light::LightingUniforms;
use crate::quad::FullscreenQuad;
use crate::shader::{ShaderContext, ShaderDefines, ShaderLibrary};
use crate::uniforms::CameraUniforms;

use super::uniform_entry;

/// Resolves the G-buffer into a color target by drawing the full-screen
/// quad. The G-buffer is read with `textureLoad`, so no sampler is bound.
pub struct LightingProgram {
    pub(crate) pipeline: wgpu::RenderPipeline,
    pub(crate) frame_layout: wgpu::BindGroupLayout,
    pub(crate) gbuffer_layout: wgpu::BindGroupLayout,
    output_format: wgpu::TextureFormat,
    shader_hash: u128,
}

impl LightingProgram {
    pub fn new(
        device: &wgpu::Device,
        shaders: &mut ShaderLibrary,
        layout: &GBufferLayout,
        output_format: wgpu::TextureFormat,
    ) -> Result<Self> {
        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Lighting Frame Layout"),
            entries: &[
                uniform_entry::<CameraUniforms>(0, wgpu::ShaderStages::FRAGMENT),
                uniform_entry::<LightingUniforms>(1, wgpu::ShaderStages::FRAGMENT),
            ],
        });

        let gbuffer_entries = layout.lighting_bind_group_layout_entries();
        let gbuffer_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Lighting GBuffer Layout"),
            entries: &gbuffer_entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Lighting Pipeline Layout"),
            bind_group_layouts: &[Some(&frame_layout), Some(&gbuffer_layout)],
            immediate_size: 0,
        });

        let ctx = ShaderContext::for_layout(layout, ShaderDefines::new());
        let (module, shader_hash) = shaders.get_or_compile(device, "lighting", &ctx)?;

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Lighting Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module,
                entry_point: Some("vs_main"),
                buffers: &[FullscreenQuad::vertex_layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: output_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!("Created lighting pipeline for {output_format:?} ({shader_hash:032x})");

        Ok(Self {
            pipeline,
            frame_layout,
            gbuffer_layout,
            output_format,
            shader_hash,
        })
    }

    /// Binds every G-buffer target and the depth texture (group 1).
    ///
    /// Must be recreated whenever the G-buffer generation changes.
    #[must_use]
    pub fn create_gbuffer_bind_group(&self, device: &wgpu::Device, gbuffer: &GeometryBuffer) -> wgpu::BindGroup {
        let entries = gbuffer.bind_group_entries();
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Lighting GBuffer BindGroup"),
            layout: &self.gbuffer_layout,
            entries: &entries,
        })
    }

    #[inline]
    #[must_use]
    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    #[inline]
    #[must_use]
    pub fn frame_layout(&self) -> &wgpu::BindGroupLayout {
        &self.frame_layout
    }

    #[inline]
    #[must_use]
    pub fn gbuffer_layout(&self) -> &wgpu::BindGroupLayout {
        &self.gbuffer_layout
    }

    #[inline]
    #[must_use]
    pub fn output_format(&self) -> wgpu::TextureFormat {
        self.output_format
    }

    #[inline]
    #[must_use]
    pub fn shader_hash(&self) -> u128 {
        self.shader_hash
    }
}
