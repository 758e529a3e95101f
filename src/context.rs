//! wgpu Context
//!
//! [`WgpuContext`] holds the core GPU handles: device, queue, surface and
//! surface configuration. It owns surface management and resize handling;
//! the G-buffer and everything else deferred lives in
//! [`DeferredHandler`](crate::deferred::DeferredHandler).

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::errors::{Result, UmbraError};
use crate::settings::ContextSettings;

/// Core wgpu context holding GPU handles.
pub struct WgpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,
}

impl WgpuContext {
    pub async fn new<W>(window: W, settings: &ContextSettings, width: u32, height: u32) -> Result<Self>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        let instance = match settings.backends {
            Some(backends) => wgpu::Instance::new(wgpu::InstanceDescriptor {
                backends,
                ..wgpu::InstanceDescriptor::new_without_display_handle()
            }),
            None => wgpu::Instance::default(),
        };
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: settings.power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| UmbraError::AdapterRequestFailed(e.to_string()))?;

        log::info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Umbra Device"),
                required_features: settings.required_features,
                required_limits: settings.required_limits.clone(),
                memory_hints: wgpu::MemoryHints::Performance,
                ..Default::default()
            })
            .await?;

        let mut config = surface
            .get_default_config(&adapter, width.max(1), height.max(1))
            .ok_or_else(|| UmbraError::SurfaceError("Surface not supported by adapter".to_string()))?;

        config.present_mode = if settings.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };
        surface.configure(&device, &config);

        Ok(Self {
            device,
            queue,
            surface,
            config,
        })
    }

    /// Reconfigures the surface. Zero sizes (minimised windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::warn!("Ignoring surface resize to {width}x{height}");
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }

    #[inline]
    #[must_use]
    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }
}
