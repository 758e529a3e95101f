//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`UmbraError`] covers:
//! - GPU and surface initialization failures
//! - Render-size and G-buffer layout validation
//! - Shader template rendering
//! - Lighting input limits
//!
//! All fallible APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, UmbraError>`.

use thiserror::Error;

use crate::gbuffer::GBufferTarget;

/// The main error type for the deferred renderer.
#[derive(Error, Debug)]
pub enum UmbraError {
    // ========================================================================
    // GPU & Surface Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// Failed to create or configure the presentation surface.
    #[error("Surface error: {0}")]
    SurfaceError(String),

    /// Window system error.
    #[error("Window system error: {0}")]
    WindowError(#[from] raw_window_handle::HandleError),

    // ========================================================================
    // Render Target Errors
    // ========================================================================
    /// The requested render size is zero or exceeds the device limit.
    #[error("Invalid render size {width}x{height} (max dimension {max})")]
    InvalidRenderSize {
        /// Requested width in pixels
        width: u32,
        /// Requested height in pixels
        height: u32,
        /// Device `max_texture_dimension_2d`
        max: u32,
    },

    /// The G-buffer layout cannot be realised on this device.
    #[error("Invalid G-buffer layout: {0}")]
    InvalidLayout(String),

    /// A G-buffer target uses a format that cannot be rendered to.
    #[error("Unsupported G-buffer format {format:?} for target {target:?}")]
    UnsupportedFormat {
        /// The offending target
        target: GBufferTarget,
        /// The rejected format
        format: wgpu::TextureFormat,
    },

    /// The depth attachment format is not a depth format.
    #[error("Unsupported depth format {0:?}")]
    UnsupportedDepthFormat(wgpu::TextureFormat),

    // ========================================================================
    // Shader Errors
    // ========================================================================
    /// Template lookup or rendering failed.
    #[error("Shader template error: {0}")]
    ShaderTemplate(#[from] minijinja::Error),

    // ========================================================================
    // Lighting Errors
    // ========================================================================
    /// More lights were submitted than the lighting uniform can hold.
    #[error("Too many lights: limit is {max}")]
    TooManyLights {
        /// Maximum number of lights per frame
        max: usize,
    },

    /// A debug view was requested for a target missing from the layout.
    #[error("Debug view requires G-buffer target {0:?}, which the layout does not contain")]
    MissingTarget(GBufferTarget),
}

impl From<wgpu::CreateSurfaceError> for UmbraError {
    fn from(err: wgpu::CreateSurfaceError) -> Self {
        UmbraError::SurfaceError(err.to_string())
    }
}

/// Alias for `Result<T, UmbraError>`.
pub type Result<T> = std::result::Result<T, UmbraError>;
