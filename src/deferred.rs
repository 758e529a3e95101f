//! Deferred Rendering Coordinator
//!
//! [`DeferredHandler`] owns everything the two deferred stages share for
//! the lifetime of the renderer:
//!
//! - the [`GeometryBuffer`] (multiple render targets + depth)
//! - the [`GeometryProgram`] that fills it
//! - the [`LightingProgram`] that resolves it
//! - the [`FullscreenQuad`] that drives the lighting stage
//!
//! # Frame Flow
//!
//! ```text
//! prepare()        camera / lights / per-draw uniforms → GPU
//!     │
//! geometry_pass()  meshes ──▶ G-buffer (cleared every frame)
//!     │
//! lighting_pass()  G-buffer ──quad──▶ target (cleared to clear_color)
//! ```
//!
//! [`DeferredHandler::render`] runs the three steps and submits.

use glam::{Mat4, UVec2};

use crate::camera::Camera;
use crate::errors::{Result, UmbraError};
use crate::gbuffer::{GBufferLayout, GeometryBuffer};
use crate::light::{DebugView, LightSet, LightingUniforms};
use crate::material::Material;
use crate::mesh::GpuMesh;
use crate::object_buffer::ObjectBuffer;
use crate::program::{GeometryProgram, LightingProgram};
use crate::quad::FullscreenQuad;
use crate::settings::DeferredSettings;
use crate::shader::ShaderLibrary;
use crate::uniforms::{CameraUniforms, ObjectUniforms};

/// A mesh drawn by the geometry pass.
#[derive(Clone, Copy)]
pub struct DrawItem<'a> {
    pub mesh: &'a GpuMesh,
    pub transform: Mat4,
    pub material: Material,
}

impl<'a> DrawItem<'a> {
    #[must_use]
    pub fn new(mesh: &'a GpuMesh, transform: Mat4, material: Material) -> Self {
        Self {
            mesh,
            transform,
            material,
        }
    }
}

/// Everything [`DeferredHandler::render`] needs for one frame.
#[derive(Clone, Copy)]
pub struct FrameInput<'a> {
    pub camera: &'a Camera,
    pub lights: &'a LightSet,
    pub draws: &'a [DrawItem<'a>],
}

/// Owns the deferred pipeline: G-buffer, geometry and lighting programs,
/// and the full-screen quad.
pub struct DeferredHandler {
    settings: DeferredSettings,
    shaders: ShaderLibrary,

    geometry_program: GeometryProgram,
    lighting_program: LightingProgram,
    geometry_buffer: GeometryBuffer,
    fullscreen_quad: FullscreenQuad,
    rendering_size: UVec2,

    camera_buffer: wgpu::Buffer,
    lighting_buffer: wgpu::Buffer,
    object_buffer: ObjectBuffer,

    /// Geometry group 0.
    camera_bind_group: wgpu::BindGroup,
    /// Lighting group 0.
    frame_bind_group: wgpu::BindGroup,
    /// Lighting group 1, valid for `gbuffer_generation`.
    gbuffer_bind_group: wgpu::BindGroup,
    gbuffer_generation: u64,

    debug_view: DebugView,
}

impl DeferredHandler {
    /// Loads the deferred shaders, sets up the G-buffer at `width` × `height`
    /// and creates the full-screen quad.
    pub fn new(device: &wgpu::Device, settings: DeferredSettings, width: u32, height: u32) -> Result<Self> {
        // Templates assume a valid layout; reject bad ones before compiling.
        settings.gbuffer.validate(&device.limits())?;

        let mut shaders = ShaderLibrary::new();
        let (geometry_program, lighting_program) =
            Self::load_shaders(device, &mut shaders, &settings.gbuffer, settings.output_format)?;

        let geometry_buffer = Self::setup_geometry_buffer(device, settings.gbuffer.clone(), width, height)?;
        let fullscreen_quad = Self::create_fullscreen_quad(device);

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Uniforms"),
            size: std::mem::size_of::<CameraUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let lighting_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Lighting Uniforms"),
            size: std::mem::size_of::<LightingUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Geometry Camera BindGroup"),
            layout: geometry_program.camera_layout(),
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Lighting Frame BindGroup"),
            layout: lighting_program.frame_layout(),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lighting_buffer.as_entire_binding(),
                },
            ],
        });

        let object_buffer = ObjectBuffer::new(
            device,
            geometry_program.object_layout(),
            settings.initial_object_capacity,
        );

        let gbuffer_bind_group = lighting_program.create_gbuffer_bind_group(device, &geometry_buffer);
        let gbuffer_generation = geometry_buffer.generation();

        log::info!(
            "Deferred handler ready at {width}x{height}, {} shader modules",
            shaders.module_count()
        );

        Ok(Self {
            settings,
            shaders,
            geometry_program,
            lighting_program,
            geometry_buffer,
            fullscreen_quad,
            rendering_size: UVec2::new(width, height),
            camera_buffer,
            lighting_buffer,
            object_buffer,
            camera_bind_group,
            frame_bind_group,
            gbuffer_bind_group,
            gbuffer_generation,
            debug_view: DebugView::Lit,
        })
    }

    fn load_shaders(
        device: &wgpu::Device,
        shaders: &mut ShaderLibrary,
        layout: &GBufferLayout,
        output_format: wgpu::TextureFormat,
    ) -> Result<(GeometryProgram, LightingProgram)> {
        let geometry = GeometryProgram::new(device, shaders, layout)?;
        let lighting = LightingProgram::new(device, shaders, layout, output_format)?;
        Ok((geometry, lighting))
    }

    fn setup_geometry_buffer(
        device: &wgpu::Device,
        layout: GBufferLayout,
        width: u32,
        height: u32,
    ) -> Result<GeometryBuffer> {
        GeometryBuffer::new(device, layout, width, height)
    }

    fn create_fullscreen_quad(device: &wgpu::Device) -> FullscreenQuad {
        FullscreenQuad::new(device)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn gbuffer(&self) -> &GeometryBuffer {
        &self.geometry_buffer
    }

    #[inline]
    #[must_use]
    pub fn rendering_size(&self) -> UVec2 {
        self.rendering_size
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &DeferredSettings {
        &self.settings
    }

    #[inline]
    #[must_use]
    pub fn geometry_program(&self) -> &GeometryProgram {
        &self.geometry_program
    }

    #[inline]
    #[must_use]
    pub fn lighting_program(&self) -> &LightingProgram {
        &self.lighting_program
    }

    #[inline]
    #[must_use]
    pub fn shaders(&self) -> &ShaderLibrary {
        &self.shaders
    }

    /// Number of per-draw uniform slots currently allocated.
    #[inline]
    #[must_use]
    pub fn object_capacity(&self) -> usize {
        self.object_buffer.capacity()
    }

    #[inline]
    #[must_use]
    pub fn debug_view(&self) -> DebugView {
        self.debug_view
    }

    /// Selects what the lighting pass outputs.
    ///
    /// Fails when the view displays a G-buffer target the layout lacks.
    pub fn set_debug_view(&mut self, view: DebugView) -> Result<()> {
        if let Some(target) = view.required_target()
            && !self.geometry_buffer.layout().contains(target)
        {
            return Err(UmbraError::MissingTarget(target));
        }
        self.debug_view = view;
        Ok(())
    }

    // ========================================================================
    // Frame
    // ========================================================================

    /// Recreates the G-buffer for a new window size.
    ///
    /// Zero or unchanged sizes are ignored and return `Ok(false)`.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) -> Result<bool> {
        if !self.geometry_buffer.resize(device, width, height)? {
            return Ok(false);
        }
        self.rendering_size = UVec2::new(width, height);
        self.refresh_gbuffer_bind_group(device);
        Ok(true)
    }

    fn refresh_gbuffer_bind_group(&mut self, device: &wgpu::Device) {
        let generation = self.geometry_buffer.generation();
        if generation == self.gbuffer_generation {
            return;
        }
        self.gbuffer_bind_group = self
            .lighting_program
            .create_gbuffer_bind_group(device, &self.geometry_buffer);
        self.gbuffer_generation = generation;
        log::debug!("Rebuilt G-buffer bind group (generation {generation})");
    }

    /// Uploads camera, lighting and per-draw uniforms for this frame.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        camera: &Camera,
        lights: &LightSet,
        draws: &[DrawItem<'_>],
    ) {
        let camera_uniforms = camera.uniforms(self.rendering_size);
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&camera_uniforms));

        let lighting_uniforms = lights.to_uniforms(self.debug_view);
        queue.write_buffer(&self.lighting_buffer, 0, bytemuck::bytes_of(&lighting_uniforms));

        let objects: Vec<ObjectUniforms> = draws
            .iter()
            .map(|draw| ObjectUniforms::new(draw.transform, &draw.material))
            .collect();
        self.object_buffer
            .write(device, queue, self.geometry_program.object_layout(), &objects);

        self.refresh_gbuffer_bind_group(device);
    }

    /// Clears the G-buffer and rasterises `draws` into it.
    ///
    /// `draws` must be the slice last passed to [`prepare`](Self::prepare);
    /// draws beyond the prepared count are skipped.
    pub fn geometry_pass(&self, encoder: &mut wgpu::CommandEncoder, draws: &[DrawItem<'_>]) {
        let prepared = self.object_buffer.len();
        if draws.len() > prepared {
            log::warn!(
                "Geometry pass got {} draws but only {prepared} were prepared",
                draws.len()
            );
        }

        let color_attachments = self.geometry_buffer.color_attachments();
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Geometry Pass"),
            color_attachments: &color_attachments,
            depth_stencil_attachment: Some(self.geometry_buffer.depth_attachment()),
            ..Default::default()
        });

        pass.set_pipeline(self.geometry_program.pipeline());
        pass.set_bind_group(0, &self.camera_bind_group, &[]);

        for (index, draw) in draws.iter().take(prepared).enumerate() {
            pass.set_bind_group(1, self.object_buffer.bind_group(), &[ObjectBuffer::offset(index)]);
            draw.mesh.draw(&mut pass);
        }
    }

    /// Shades the G-buffer into `target`. Pixels no geometry covered keep
    /// the clear color.
    pub fn lighting_pass(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Lighting Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.settings.clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            ..Default::default()
        });

        pass.set_pipeline(self.lighting_program.pipeline());
        pass.set_bind_group(0, &self.frame_bind_group, &[]);
        pass.set_bind_group(1, &self.gbuffer_bind_group, &[]);
        self.render_fullscreen_quad(&mut pass);
    }

    /// Draws the full-screen quad on a pass whose pipeline and bind groups
    /// are already set.
    pub fn render_fullscreen_quad(&self, pass: &mut wgpu::RenderPass<'_>) {
        self.fullscreen_quad.draw(pass);
    }

    /// Prepares, runs both passes into `target` and submits.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        frame: &FrameInput<'_>,
    ) {
        self.prepare(device, queue, frame.camera, frame.lights, frame.draws);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Deferred Encoder"),
        });
        self.geometry_pass(&mut encoder, frame.draws);
        self.lighting_pass(&mut encoder, target);
        queue.submit(Some(encoder.finish()));
    }
}

impl Drop for DeferredHandler {
    fn drop(&mut self) {
        self.camera_buffer.destroy();
        self.lighting_buffer.destroy();
        log::debug!("Deferred handler released");
    }
}
