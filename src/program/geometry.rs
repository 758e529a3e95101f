use crate::errors::Result;
use crate::gbuffer::GBufferLayout;
use crate::mesh::MeshVertex;
use crate::object_buffer::object_bind_group_layout_entry;
use crate::shader::{ShaderContext, ShaderDefines, ShaderLibrary};
use crate::uniforms::CameraUniforms;

use super::uniform_entry;

/// Fills the G-buffer: one fragment output per layout target, depth tested
/// and written.
pub struct GeometryProgram {
    pub(crate) pipeline: wgpu::RenderPipeline,
    pub(crate) camera_layout: wgpu::BindGroupLayout,
    pub(crate) object_layout: wgpu::BindGroupLayout,
    shader_hash: u128,
}

impl GeometryProgram {
    pub fn new(device: &wgpu::Device, shaders: &mut ShaderLibrary, layout: &GBufferLayout) -> Result<Self> {
        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Geometry Camera Layout"),
            entries: &[uniform_entry::<CameraUniforms>(
                0,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            )],
        });

        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Geometry Object Layout"),
            entries: &[object_bind_group_layout_entry()],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Geometry Pipeline Layout"),
            bind_group_layouts: &[Some(&camera_layout), Some(&object_layout)],
            immediate_size: 0,
        });

        let ctx = ShaderContext::for_layout(layout, ShaderDefines::new());
        let (module, shader_hash) = shaders.get_or_compile(device, "geometry", &ctx)?;

        let targets = layout.color_target_states();
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Geometry Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module,
                entry_point: Some("vs_main"),
                buffers: &[MeshVertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: Some("fs_main"),
                targets: &targets,
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: layout.depth_format(),
                depth_write_enabled: Some(true),
                depth_compare: Some(wgpu::CompareFunction::Less),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!(
            "Created geometry pipeline with {} targets ({shader_hash:032x})",
            layout.targets().len()
        );

        Ok(Self {
            pipeline,
            camera_layout,
            object_layout,
            shader_hash,
        })
    }

    #[inline]
    #[must_use]
    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    #[inline]
    #[must_use]
    pub fn camera_layout(&self) -> &wgpu::BindGroupLayout {
        &self.camera_layout
    }

    #[inline]
    #[must_use]
    pub fn object_layout(&self) -> &wgpu::BindGroupLayout {
        &self.object_layout
    }

    /// xxh3-128 hash of the generated WGSL.
    #[inline]
    #[must_use]
    pub fn shader_hash(&self) -> u128 {
        self.shader_hash
    }
}
