//! Deferred Demo
//!
//! A ground plane, a ring of boxes and spheres, one directional light and a
//! handful of orbiting point and spot lights, shaded in a single full-screen
//! lighting pass.
//!
//! Keys:
//! - `1`..`7`: lit, position, normal, albedo, specular, emissive, depth
//! - `Space`: pause the light animation
//!
//! Run: `cargo run -p deferred_demo --release`

use std::f32::consts::TAU;
use std::sync::Arc;
use std::time::Instant;

use glam::{Mat4, Quat, Vec3};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

use umbra::{
    Camera, ContextSettings, DebugView, DeferredHandler, DeferredSettings, DrawItem, FrameInput,
    GBufferLayout, GpuMesh, Light, LightSet, Material, WgpuContext, create_box, create_plane,
    create_sphere,
};

const ORBITING_LIGHTS: usize = 8;

struct SceneObject {
    mesh: usize,
    transform: Mat4,
    material: Material,
}

/// GPU state, created once the window exists.
struct Gpu {
    context: WgpuContext,
    deferred: DeferredHandler,
    meshes: Vec<GpuMesh>,
}

struct DeferredDemo {
    window: Option<Arc<Window>>,
    gpu: Option<Gpu>,
    camera: Camera,
    objects: Vec<SceneObject>,
    lights: LightSet,
    start_time: Instant,
    paused_at: Option<f32>,
}

impl DeferredDemo {
    fn new() -> Self {
        Self {
            window: None,
            gpu: None,
            camera: Camera::look_at(Vec3::new(0.0, 6.0, 14.0), Vec3::new(0.0, 0.5, 0.0)),
            objects: Self::build_scene(),
            lights: LightSet::new(Vec3::splat(0.04)),
            start_time: Instant::now(),
            paused_at: None,
        }
    }

    fn build_scene() -> Vec<SceneObject> {
        let mut objects = vec![SceneObject {
            mesh: 0,
            transform: Mat4::IDENTITY,
            material: Material::new(Vec3::splat(0.6)).with_specular(Vec3::splat(0.2), 16.0),
        }];

        for i in 0..10 {
            let angle = i as f32 / 10.0 * TAU;
            let position = Vec3::new(angle.cos() * 5.0, 0.75, angle.sin() * 5.0);
            let hue = Vec3::new(
                0.5 + 0.5 * angle.cos(),
                0.5 + 0.5 * (angle + TAU / 3.0).cos(),
                0.5 + 0.5 * (angle + 2.0 * TAU / 3.0).cos(),
            );
            let (mesh, rotation) = if i % 2 == 0 {
                (1, Quat::from_rotation_y(angle))
            } else {
                (2, Quat::IDENTITY)
            };
            objects.push(SceneObject {
                mesh,
                transform: Mat4::from_rotation_translation(rotation, position),
                material: Material::new(hue).with_specular(Vec3::ONE, 64.0),
            });
        }

        objects.push(SceneObject {
            mesh: 2,
            transform: Mat4::from_scale_rotation_translation(Vec3::splat(1.5), Quat::IDENTITY, Vec3::new(0.0, 1.5, 0.0)),
            material: Material::new(Vec3::new(0.1, 0.1, 0.12))
                .with_specular(Vec3::ONE, 128.0)
                .with_emissive(Vec3::new(0.4, 0.8, 1.6)),
        });

        objects
    }

    fn elapsed(&self) -> f32 {
        self.paused_at
            .unwrap_or_else(|| self.start_time.elapsed().as_secs_f32())
    }

    fn update_lights(&mut self) -> umbra::Result<()> {
        let t = self.elapsed();
        self.lights.clear();
        self.lights.push(Light::directional(
            Vec3::new(-0.4, -1.0, -0.3),
            Vec3::new(1.0, 0.95, 0.85),
            0.4,
        ))?;

        for i in 0..ORBITING_LIGHTS {
            let phase = i as f32 / ORBITING_LIGHTS as f32 * TAU + t * 0.5;
            let position = Vec3::new(phase.cos() * 3.5, 1.2, phase.sin() * 3.5);
            let color = Vec3::new(
                0.6 + 0.4 * phase.sin(),
                0.6 + 0.4 * (phase * 1.7).cos(),
                0.8,
            );
            self.lights.push(Light::point(position, 6.0, color, 2.0))?;
        }

        self.lights.push(Light::spot(
            Vec3::new(0.0, 8.0, 0.0),
            Vec3::NEG_Y,
            20.0,
            0.25,
            0.35,
            Vec3::ONE,
            3.0,
        ))?;
        Ok(())
    }

    fn init_gpu(&self, window: Arc<Window>) -> anyhow::Result<Gpu> {
        let size = window.inner_size();
        let context = pollster::block_on(WgpuContext::new(
            window,
            &ContextSettings::default(),
            size.width,
            size.height,
        ))?;

        let settings = DeferredSettings {
            gbuffer: GBufferLayout::standard().with_emissive(),
            output_format: context.color_format(),
            clear_color: wgpu::Color {
                r: 0.02,
                g: 0.02,
                b: 0.03,
                a: 1.0,
            },
            ..Default::default()
        };
        let (width, height) = context.size();
        let deferred = DeferredHandler::new(&context.device, settings, width, height)?;

        let meshes = vec![
            create_plane(30.0, 30.0, 1, 1).upload(&context.device, "Ground"),
            create_box(1.2, 1.5, 1.2).upload(&context.device, "Box"),
            create_sphere(0.75, 32, 16).upload(&context.device, "Sphere"),
        ];

        Ok(Gpu {
            context,
            deferred,
            meshes,
        })
    }

    fn render(&mut self) {
        if let Err(e) = self.update_lights() {
            log::error!("Light update failed: {e}");
            return;
        }

        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        let output = match gpu.context.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(output)
            | wgpu::CurrentSurfaceTexture::Suboptimal(output) => output,
            wgpu::CurrentSurfaceTexture::Lost | wgpu::CurrentSurfaceTexture::Outdated => {
                let (width, height) = gpu.context.size();
                gpu.context.resize(width, height);
                return;
            }
            e => {
                log::error!("Render error: {e:?}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let draws: Vec<DrawItem<'_>> = self
            .objects
            .iter()
            .map(|object| DrawItem::new(&gpu.meshes[object.mesh], object.transform, object.material))
            .collect();

        gpu.deferred.render(
            &gpu.context.device,
            &gpu.context.queue,
            &view,
            &FrameInput {
                camera: &self.camera,
                lights: &self.lights,
                draws: &draws,
            },
        );
        output.present();
    }

    fn resize(&mut self, width: u32, height: u32) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        gpu.context.resize(width, height);
        match gpu.deferred.resize(&gpu.context.device, width, height) {
            Ok(true) => self.camera.set_aspect_from_size(width, height),
            Ok(false) => {}
            Err(e) => log::error!("Resize failed: {e}"),
        }
    }

    fn handle_key(&mut self, key: &Key) {
        let view = match key {
            Key::Named(NamedKey::Space) => {
                self.paused_at = match self.paused_at {
                    Some(t) => {
                        self.start_time = Instant::now() - std::time::Duration::from_secs_f32(t);
                        None
                    }
                    None => Some(self.start_time.elapsed().as_secs_f32()),
                };
                return;
            }
            Key::Character(c) => match c.as_str() {
                "1" => DebugView::Lit,
                "2" => DebugView::Position,
                "3" => DebugView::Normal,
                "4" => DebugView::Albedo,
                "5" => DebugView::Specular,
                "6" => DebugView::Emissive,
                "7" => DebugView::Depth,
                _ => return,
            },
            _ => return,
        };

        if let Some(gpu) = self.gpu.as_mut() {
            match gpu.deferred.set_debug_view(view) {
                Ok(()) => log::info!("Debug view: {view:?}"),
                Err(e) => log::warn!("{e}"),
            }
        }
    }
}

impl ApplicationHandler for DeferredDemo {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title("Umbra Deferred Demo")
            .with_inner_size(winit::dpi::LogicalSize::new(1280.0, 720.0));

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        log::info!("Initializing deferred renderer...");
        match self.init_gpu(window.clone()) {
            Ok(gpu) => {
                let (width, height) = gpu.context.size();
                self.camera.set_aspect_from_size(width, height);
                self.gpu = Some(gpu);
                window.request_redraw();
            }
            Err(e) => {
                log::error!("Fatal renderer error: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => self.resize(size.width, size.height),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => self.handle_key(&logical_key),
            WindowEvent::RedrawRequested => {
                self.render();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = DeferredDemo::new();
    event_loop.run_app(&mut app)?;
    Ok(())
}
