//! Renderer Settings
//!
//! Configuration consumed once at construction time:
//!
//! - [`ContextSettings`] selects the adapter and configures the surface for
//!   [`WgpuContext`](crate::context::WgpuContext).
//! - [`DeferredSettings`] sizes and formats the deferred pipeline owned by
//!   [`DeferredHandler`](crate::deferred::DeferredHandler).
//!
//! # Example
//!
//! ```rust,ignore
//! use umbra::{DeferredSettings, GBufferLayout};
//!
//! let settings = DeferredSettings {
//!     gbuffer: GBufferLayout::standard().with_emissive(),
//!     output_format: context.color_format(),
//!     ..Default::default()
//! };
//! ```

use crate::gbuffer::GBufferLayout;

// ---------------------------------------------------------------------------
// ContextSettings
// ---------------------------------------------------------------------------

/// GPU adapter, device and surface configuration.
///
/// # Fields
///
/// | Field               | Description                       | Default           |
/// |---------------------|-----------------------------------|-------------------|
/// | `vsync`             | Vertical sync enabled             | `true`            |
/// | `backends`          | Forced wgpu backend (or auto)     | `None`            |
/// | `power_preference`  | GPU adapter selection strategy    | `HighPerformance` |
/// | `required_features` | Required wgpu features            | Empty             |
/// | `required_limits`   | Required wgpu limits              | Default           |
#[derive(Debug, Clone)]
pub struct ContextSettings {
    /// Caps presentation to the display refresh rate when `true`.
    pub vsync: bool,

    /// Force a specific wgpu backend. `None` lets wgpu choose.
    pub backends: Option<wgpu::Backends>,

    pub power_preference: wgpu::PowerPreference,

    pub required_features: wgpu::Features,

    /// Required device limits.
    ///
    /// Raise `max_color_attachment_bytes_per_sample` here when the G-buffer
    /// layout carries an explicit position target next to emissive.
    pub required_limits: wgpu::Limits,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            vsync: true,
            backends: None,
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// DeferredSettings
// ---------------------------------------------------------------------------

/// Deferred pipeline configuration.
///
/// # Fields
///
/// | Field                     | Description                              | Default                     |
/// |---------------------------|------------------------------------------|-----------------------------|
/// | `gbuffer`                 | G-buffer targets and depth format        | `GBufferLayout::standard()` |
/// | `output_format`           | Format of the lighting pass target       | `Bgra8UnormSrgb`            |
/// | `clear_color`             | Color of pixels no geometry covered      | Black (0,0,0,1)             |
/// | `initial_object_capacity` | Per-draw uniform slots allocated upfront | 64                          |
#[derive(Debug, Clone)]
pub struct DeferredSettings {
    /// Targets written by the geometry pass. Validated against the device
    /// limits when the handler is created.
    pub gbuffer: GBufferLayout,

    /// Must match the view passed to the lighting pass, usually the surface
    /// format.
    pub output_format: wgpu::TextureFormat,

    /// Background clear color of the lighting target.
    pub clear_color: wgpu::Color,

    /// The object buffer grows past this on demand.
    pub initial_object_capacity: usize,
}

impl Default for DeferredSettings {
    fn default() -> Self {
        Self {
            gbuffer: GBufferLayout::standard(),
            output_format: wgpu::TextureFormat::Bgra8UnormSrgb,
            clear_color: wgpu::Color {
                r: 0.0,
                g: 0.0,
                b: 0.0,
                a: 1.0,
            },
            initial_object_capacity: 64,
        }
    }
}
