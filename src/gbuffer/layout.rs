//! G-Buffer Layout
//!
//! Describes which surface attributes the geometry pass writes, in which
//! order (the order is the shader output location), and with which formats.
//!
//! # Presets
//!
//! | Preset                       | Targets                                   | Bytes/sample |
//! |------------------------------|-------------------------------------------|--------------|
//! | [`GBufferLayout::standard`]  | Normal, Albedo, Specular                  | 24           |
//! | `.with_emissive()`           | + Emissive (`Rgba16Float`)                | 32           |
//! | `.with_position()`           | + Position (`Rgba32Float`)                | +16          |
//!
//! Without an explicit position target the lighting shader reconstructs the
//! world position from the depth buffer and the inverse view-projection.
//!
//! The byte budget follows the WebGPU render-target rule: for every
//! attachment the running total is rounded up to the format's component
//! alignment and then the format's byte cost is added. Default
//! [`wgpu::Limits`] allow 32 bytes, so `standard().with_position()` needs a
//! raised `max_color_attachment_bytes_per_sample`.

use smallvec::SmallVec;

use crate::errors::{Result, UmbraError};

/// Maximum number of color targets a layout may hold.
pub const MAX_GBUFFER_TARGETS: usize = 8;

/// A per-pixel surface attribute stored by the geometry pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GBufferTarget {
    /// World-space position (xyz).
    Position,
    /// World-space normal, encoded as `n * 0.5 + 0.5`.
    Normal,
    /// Diffuse albedo (rgb).
    Albedo,
    /// Specular color (rgb), shininess / 255 (a).
    Specular,
    /// Emitted radiance (rgb), HDR.
    Emissive,
}

impl GBufferTarget {
    pub const ALL: [GBufferTarget; 5] = [
        GBufferTarget::Position,
        GBufferTarget::Normal,
        GBufferTarget::Albedo,
        GBufferTarget::Specular,
        GBufferTarget::Emissive,
    ];

    #[must_use]
    pub fn default_format(self) -> wgpu::TextureFormat {
        match self {
            Self::Position => wgpu::TextureFormat::Rgba32Float,
            Self::Normal | Self::Emissive => wgpu::TextureFormat::Rgba16Float,
            Self::Albedo | Self::Specular => wgpu::TextureFormat::Rgba8Unorm,
        }
    }

    /// Identifier used for this target in generated WGSL.
    #[must_use]
    pub fn wgsl_name(self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Normal => "normal",
            Self::Albedo => "albedo",
            Self::Specular => "specular",
            Self::Emissive => "emissive",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Position => "GBuffer Position",
            Self::Normal => "GBuffer Normal",
            Self::Albedo => "GBuffer Albedo",
            Self::Specular => "GBuffer Specular",
            Self::Emissive => "GBuffer Emissive",
        }
    }

    fn is_required(self) -> bool {
        matches!(self, Self::Normal | Self::Albedo)
    }
}

/// Render-target byte cost and component alignment of a G-buffer format.
///
/// Returns `None` for formats that cannot back a G-buffer target. Targets
/// carry four channels, so only RGBA formats are accepted.
#[must_use]
pub fn target_format_cost(format: wgpu::TextureFormat) -> Option<(u32, u32)> {
    use wgpu::TextureFormat as F;
    match format {
        F::Rgba8Unorm => Some((8, 1)),
        F::Rgba16Float => Some((8, 2)),
        F::Rgb10a2Unorm => Some((8, 4)),
        F::Rgba32Float => Some((16, 4)),
        _ => None,
    }
}

/// Returns `true` when the format has a depth aspect usable as the G-buffer
/// depth attachment.
#[must_use]
pub fn is_depth_format(format: wgpu::TextureFormat) -> bool {
    matches!(
        format,
        wgpu::TextureFormat::Depth16Unorm
            | wgpu::TextureFormat::Depth24Plus
            | wgpu::TextureFormat::Depth24PlusStencil8
            | wgpu::TextureFormat::Depth32Float
            | wgpu::TextureFormat::Depth32FloatStencil8
    )
}

/// A single color attachment of the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GBufferTargetDesc {
    pub target: GBufferTarget,
    pub format: wgpu::TextureFormat,
}

/// Ordered set of G-buffer color targets plus the depth format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GBufferLayout {
    targets: SmallVec<[GBufferTargetDesc; MAX_GBUFFER_TARGETS]>,
    depth_format: wgpu::TextureFormat,
}

impl Default for GBufferLayout {
    fn default() -> Self {
        Self::standard()
    }
}

impl GBufferLayout {
    /// Creates an empty layout with the given depth format.
    ///
    /// An empty layout does not validate; push at least the normal and
    /// albedo targets.
    #[must_use]
    pub fn empty(depth_format: wgpu::TextureFormat) -> Self {
        Self {
            targets: SmallVec::new(),
            depth_format,
        }
    }

    /// Normal + Albedo + Specular over a `Depth32Float` depth buffer.
    #[must_use]
    pub fn standard() -> Self {
        Self::empty(wgpu::TextureFormat::Depth32Float)
            .with_target(GBufferTarget::Normal)
            .with_target(GBufferTarget::Albedo)
            .with_target(GBufferTarget::Specular)
    }

    /// Appends a target with its default format.
    #[must_use]
    pub fn with_target(self, target: GBufferTarget) -> Self {
        self.with_target_format(target, target.default_format())
    }

    /// Appends a target with an explicit format.
    #[must_use]
    pub fn with_target_format(mut self, target: GBufferTarget, format: wgpu::TextureFormat) -> Self {
        self.targets.push(GBufferTargetDesc { target, format });
        self
    }

    #[must_use]
    pub fn with_position(self) -> Self {
        self.with_target(GBufferTarget::Position)
    }

    #[must_use]
    pub fn with_emissive(self) -> Self {
        self.with_target(GBufferTarget::Emissive)
    }

    #[must_use]
    pub fn with_depth_format(mut self, format: wgpu::TextureFormat) -> Self {
        self.depth_format = format;
        self
    }

    #[inline]
    #[must_use]
    pub fn targets(&self) -> &[GBufferTargetDesc] {
        &self.targets
    }

    #[inline]
    #[must_use]
    pub fn depth_format(&self) -> wgpu::TextureFormat {
        self.depth_format
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, target: GBufferTarget) -> bool {
        self.location_of(target).is_some()
    }

    /// Fragment output location of `target` in the geometry pass.
    #[must_use]
    pub fn location_of(&self, target: GBufferTarget) -> Option<u32> {
        self.targets
            .iter()
            .position(|desc| desc.target == target)
            .map(|index| index as u32)
    }

    /// Binding index of the depth texture in the lighting G-buffer group.
    ///
    /// Color targets occupy bindings `0..len`, depth follows them.
    #[inline]
    #[must_use]
    pub fn depth_binding(&self) -> u32 {
        self.targets.len() as u32
    }

    /// Render-target bytes per sample of the color attachments.
    pub fn bytes_per_sample(&self) -> Result<u32> {
        let mut total = 0u32;
        for desc in &self.targets {
            let (cost, alignment) = target_format_cost(desc.format).ok_or(
                UmbraError::UnsupportedFormat {
                    target: desc.target,
                    format: desc.format,
                },
            )?;
            total = total.next_multiple_of(alignment) + cost;
        }
        Ok(total)
    }

    /// Checks the layout against the device limits.
    pub fn validate(&self, limits: &wgpu::Limits) -> Result<()> {
        for required in GBufferTarget::ALL.into_iter().filter(|t| t.is_required()) {
            if !self.contains(required) {
                return Err(UmbraError::InvalidLayout(format!(
                    "missing required target {required:?}"
                )));
            }
        }

        for (index, desc) in self.targets.iter().enumerate() {
            if self.targets[..index].iter().any(|d| d.target == desc.target) {
                return Err(UmbraError::InvalidLayout(format!(
                    "target {:?} appears more than once",
                    desc.target
                )));
            }
        }

        let max_attachments = (limits.max_color_attachments as usize).min(MAX_GBUFFER_TARGETS);
        if self.targets.len() > max_attachments {
            return Err(UmbraError::InvalidLayout(format!(
                "{} color targets exceed the limit of {max_attachments}",
                self.targets.len()
            )));
        }

        let bytes = self.bytes_per_sample()?;
        if bytes > limits.max_color_attachment_bytes_per_sample {
            return Err(UmbraError::InvalidLayout(format!(
                "{bytes} bytes per sample exceed the limit of {}",
                limits.max_color_attachment_bytes_per_sample
            )));
        }

        if !is_depth_format(self.depth_format) {
            return Err(UmbraError::UnsupportedDepthFormat(self.depth_format));
        }

        Ok(())
    }

    /// Color target states for the geometry pipeline, in location order.
    #[must_use]
    pub fn color_target_states(&self) -> SmallVec<[Option<wgpu::ColorTargetState>; MAX_GBUFFER_TARGETS]> {
        self.targets
            .iter()
            .map(|desc| {
                Some(wgpu::ColorTargetState {
                    format: desc.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })
            })
            .collect()
    }

    /// Bind group layout entries through which the lighting pass reads the
    /// G-buffer: one unfilterable float texture per target, then depth.
    ///
    /// Textures are read with `textureLoad`, so no sampler is bound and
    /// `Rgba32Float` works without the float32-filterable feature. Depth is
    /// bound as an unfilterable float texture as well (through its DepthOnly
    /// view); the GL backend cannot `textureLoad` a `texture_depth_2d`.
    #[must_use]
    pub fn lighting_bind_group_layout_entries(&self) -> Vec<wgpu::BindGroupLayoutEntry> {
        (0..=self.depth_binding())
            .map(|binding| wgpu::BindGroupLayoutEntry {
                binding,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: false },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            })
            .collect()
    }
}
