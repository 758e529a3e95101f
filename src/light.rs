//! Lights for the lighting pass.
//!
//! Lights are gathered into a [`LightSet`] each frame and packed into a
//! single [`LightingUniforms`] block read by `lighting.wgsl`.
//!
//! # GPU Layout
//!
//! ```text
//! LightingUniforms (16 + 16 + 64 × MAX_LIGHTS bytes)
//! ├─ ambient      vec4<f32>      rgb = ambient radiance
//! ├─ light_count  u32
//! ├─ debug_view   u32
//! ├─ _pad         2 × u32
//! └─ lights       array<GpuLight, MAX_LIGHTS>
//!
//! GpuLight (64 bytes)
//! ├─ position  vec3 │ kind        u32
//! ├─ direction vec3 │ inner_cos   f32
//! ├─ color     vec3 │ intensity   f32
//! └─ attenuation vec3 │ outer_cos f32
//! ```

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::errors::{Result, UmbraError};
use crate::gbuffer::GBufferTarget;

/// Maximum number of lights shaded per frame.
pub const MAX_LIGHTS: usize = 64;

const KIND_DIRECTIONAL: u32 = 0;
const KIND_POINT: u32 = 1;
const KIND_SPOT: u32 = 2;

const SPOT_EDGE_EPSILON: f32 = 1e-4;

/// Distance falloff `1 / (constant + linear·d + quadratic·d²)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for Attenuation {
    fn default() -> Self {
        Self {
            constant: 1.0,
            linear: 0.0,
            quadratic: 0.0,
        }
    }
}

impl Attenuation {
    /// Coefficients that bring the light to 1/80.5 of its intensity at
    /// `range` (`1 + 4.5 + 75`). Non-positive ranges give no falloff.
    #[must_use]
    pub fn from_range(range: f32) -> Self {
        if range <= 0.0 {
            return Self::default();
        }
        Self {
            constant: 1.0,
            linear: 4.5 / range,
            quadratic: 75.0 / (range * range),
        }
    }

    #[must_use]
    pub fn factor(&self, distance: f32) -> f32 {
        let denom = self.constant + self.linear * distance + self.quadratic * distance * distance;
        if denom <= f32::EPSILON { 1.0 } else { 1.0 / denom }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Directional {
        /// Direction the light travels (normalized).
        direction: Vec3,
    },
    Point {
        position: Vec3,
        attenuation: Attenuation,
    },
    Spot {
        position: Vec3,
        direction: Vec3,
        attenuation: Attenuation,
        /// Half-angle of the full-intensity cone, radians.
        inner_cone: f32,
        /// Half-angle where intensity reaches zero, radians.
        outer_cone: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub color: Vec3,
    pub intensity: f32,
}

fn normalize_direction(direction: Vec3) -> Vec3 {
    direction.try_normalize().unwrap_or(Vec3::NEG_Y)
}

impl Light {
    #[must_use]
    pub fn directional(direction: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            kind: LightKind::Directional {
                direction: normalize_direction(direction),
            },
            color,
            intensity,
        }
    }

    #[must_use]
    pub fn point(position: Vec3, range: f32, color: Vec3, intensity: f32) -> Self {
        Self {
            kind: LightKind::Point {
                position,
                attenuation: Attenuation::from_range(range),
            },
            color,
            intensity,
        }
    }

    /// Spot light; cone angles are half-angles in radians and are reordered
    /// so that `inner ≤ outer`.
    #[must_use]
    pub fn spot(
        position: Vec3,
        direction: Vec3,
        range: f32,
        inner_cone: f32,
        outer_cone: f32,
        color: Vec3,
        intensity: f32,
    ) -> Self {
        let inner = inner_cone.min(outer_cone).max(0.0);
        let outer = inner_cone.max(outer_cone).min(std::f32::consts::FRAC_PI_2);
        Self {
            kind: LightKind::Spot {
                position,
                direction: normalize_direction(direction),
                attenuation: Attenuation::from_range(range),
                inner_cone: inner.min(outer),
                outer_cone: outer,
            },
            color,
            intensity,
        }
    }

    #[must_use]
    pub fn to_gpu(&self) -> GpuLight {
        let mut gpu = GpuLight {
            color: self.color.to_array(),
            intensity: self.intensity,
            inner_cos: 1.0,
            outer_cos: 1.0,
            attenuation: [1.0, 0.0, 0.0],
            ..GpuLight::zeroed()
        };

        match self.kind {
            LightKind::Directional { direction } => {
                gpu.kind = KIND_DIRECTIONAL;
                gpu.direction = direction.to_array();
            }
            LightKind::Point {
                position,
                attenuation,
            } => {
                gpu.kind = KIND_POINT;
                gpu.position = position.to_array();
                gpu.attenuation = [attenuation.constant, attenuation.linear, attenuation.quadratic];
            }
            LightKind::Spot {
                position,
                direction,
                attenuation,
                inner_cone,
                outer_cone,
            } => {
                gpu.kind = KIND_SPOT;
                gpu.position = position.to_array();
                gpu.direction = direction.to_array();
                gpu.attenuation = [attenuation.constant, attenuation.linear, attenuation.quadratic];
                // smoothstep(outer, inner) needs a non-empty edge interval
                gpu.inner_cos = inner_cone.cos();
                gpu.outer_cos = outer_cone.cos().min(gpu.inner_cos - SPOT_EDGE_EPSILON);
            }
        }

        gpu
    }
}

/// Per-light GPU record; see the module docs for the layout.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuLight {
    pub position: [f32; 3],
    pub kind: u32,
    pub direction: [f32; 3],
    pub inner_cos: f32,
    pub color: [f32; 3],
    pub intensity: f32,
    pub attenuation: [f32; 3],
    pub outer_cos: f32,
}

/// Lighting-pass uniform block (group 0, binding 1 of the lighting program).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct LightingUniforms {
    pub ambient: [f32; 4],
    pub light_count: u32,
    pub debug_view: u32,
    pub _pad: [u32; 2],
    pub lights: [GpuLight; MAX_LIGHTS],
}

impl Default for LightingUniforms {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// What the lighting pass writes to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DebugView {
    /// Fully shaded output.
    #[default]
    Lit,
    Position,
    Normal,
    Albedo,
    Specular,
    Emissive,
    /// Linearised depth.
    Depth,
}

impl DebugView {
    #[must_use]
    pub fn as_u32(self) -> u32 {
        match self {
            Self::Lit => 0,
            Self::Position => 1,
            Self::Normal => 2,
            Self::Albedo => 3,
            Self::Specular => 4,
            Self::Emissive => 5,
            Self::Depth => 6,
        }
    }

    /// G-buffer target the view displays, if it reads one directly.
    ///
    /// Position is absent here because it can be reconstructed from depth.
    #[must_use]
    pub fn required_target(self) -> Option<GBufferTarget> {
        match self {
            Self::Normal => Some(GBufferTarget::Normal),
            Self::Albedo => Some(GBufferTarget::Albedo),
            Self::Specular => Some(GBufferTarget::Specular),
            Self::Emissive => Some(GBufferTarget::Emissive),
            Self::Lit | Self::Position | Self::Depth => None,
        }
    }
}

/// Lights shaded in one frame plus the ambient term.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightSet {
    pub ambient: Vec3,
    lights: Vec<Light>,
}

impl LightSet {
    #[must_use]
    pub fn new(ambient: Vec3) -> Self {
        Self {
            ambient,
            lights: Vec::new(),
        }
    }

    pub fn push(&mut self, light: Light) -> Result<()> {
        if self.lights.len() >= MAX_LIGHTS {
            return Err(UmbraError::TooManyLights { max: MAX_LIGHTS });
        }
        self.lights.push(light);
        Ok(())
    }

    #[must_use]
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn lights_mut(&mut self) -> &mut [Light] {
        &mut self.lights
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    pub fn clear(&mut self) {
        self.lights.clear();
    }

    #[must_use]
    pub fn to_uniforms(&self, debug_view: DebugView) -> LightingUniforms {
        let mut uniforms = LightingUniforms {
            ambient: self.ambient.extend(1.0).to_array(),
            light_count: self.lights.len() as u32,
            debug_view: debug_view.as_u32(),
            ..LightingUniforms::zeroed()
        };
        for (slot, light) in uniforms.lights.iter_mut().zip(&self.lights) {
            *slot = light.to_gpu();
        }
        uniforms
    }
}
