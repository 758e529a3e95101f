//! # Umbra
//!
//! Deferred shading core for wgpu.
//!
//! A [`DeferredHandler`] owns the G-buffer, the geometry-pass and
//! lighting-pass programs and the full-screen quad that resolves lighting.
//! Meshes are rasterised into the G-buffer once per frame, then a single
//! full-screen draw shades every covered pixel for all lights at once.
//!
//! ```rust,ignore
//! let mut deferred = DeferredHandler::new(&ctx.device, settings, width, height)?;
//!
//! // per frame
//! deferred.render(&ctx.device, &ctx.queue, &view, &FrameInput {
//!     camera: &camera,
//!     lights: &lights,
//!     draws: &draws,
//! });
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod camera;
pub mod context;
pub mod deferred;
pub mod errors;
pub mod gbuffer;
pub mod light;
pub mod material;
pub mod mesh;
pub mod object_buffer;
pub mod primitives;
pub mod program;
pub mod quad;
pub mod settings;
pub mod shader;
pub mod uniforms;

pub use camera::Camera;
pub use context::WgpuContext;
pub use deferred::{DeferredHandler, DrawItem, FrameInput};
pub use errors::{Result, UmbraError};
pub use gbuffer::{GBufferLayout, GBufferTarget, GeometryBuffer};
pub use light::{Attenuation, DebugView, Light, LightKind, LightSet, MAX_LIGHTS};
pub use material::Material;
pub use mesh::{GpuMesh, MeshData, MeshVertex};
pub use primitives::{create_box, create_plane, create_sphere};
pub use program::{GeometryProgram, LightingProgram};
pub use quad::FullscreenQuad;
pub use settings::{ContextSettings, DeferredSettings};
pub use shader::{ShaderContext, ShaderDefines, ShaderLibrary};
