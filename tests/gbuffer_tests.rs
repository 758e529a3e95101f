//! G-Buffer Layout Tests
//!
//! Tests for:
//! - Presets and target ordering (shader locations, depth binding)
//! - Render-target bytes-per-sample accounting
//! - Layout validation against device limits
//! - Pipeline / bind group layout derivation
//! - Render size validation

use umbra::errors::UmbraError;
use umbra::gbuffer::{
    GBufferLayout, GBufferTarget, is_depth_format, target_format_cost, validate_render_size,
};

fn limits() -> wgpu::Limits {
    wgpu::Limits::default()
}

// ============================================================================
// Presets & Ordering
// ============================================================================

#[test]
fn standard_layout_has_normal_albedo_specular() {
    let layout = GBufferLayout::standard();
    let targets: Vec<_> = layout.targets().iter().map(|d| d.target).collect();

    assert_eq!(
        targets,
        vec![GBufferTarget::Normal, GBufferTarget::Albedo, GBufferTarget::Specular]
    );
    assert_eq!(layout.depth_format(), wgpu::TextureFormat::Depth32Float);
    assert!(!layout.contains(GBufferTarget::Position));
    assert!(!layout.contains(GBufferTarget::Emissive));
}

#[test]
fn default_layout_is_standard() {
    assert_eq!(GBufferLayout::default(), GBufferLayout::standard());
}

#[test]
fn locations_follow_insertion_order() {
    let layout = GBufferLayout::standard().with_emissive().with_position();

    assert_eq!(layout.location_of(GBufferTarget::Normal), Some(0));
    assert_eq!(layout.location_of(GBufferTarget::Albedo), Some(1));
    assert_eq!(layout.location_of(GBufferTarget::Specular), Some(2));
    assert_eq!(layout.location_of(GBufferTarget::Emissive), Some(3));
    assert_eq!(layout.location_of(GBufferTarget::Position), Some(4));
}

#[test]
fn depth_binding_follows_color_targets() {
    assert_eq!(GBufferLayout::standard().depth_binding(), 3);
    assert_eq!(GBufferLayout::standard().with_emissive().depth_binding(), 4);
}

#[test]
fn targets_use_their_default_formats() {
    let layout = GBufferLayout::standard().with_emissive().with_position();
    for desc in layout.targets() {
        assert_eq!(desc.format, desc.target.default_format(), "{:?}", desc.target);
    }
    assert_eq!(GBufferTarget::Position.default_format(), wgpu::TextureFormat::Rgba32Float);
    assert_eq!(GBufferTarget::Normal.default_format(), wgpu::TextureFormat::Rgba16Float);
    assert_eq!(GBufferTarget::Albedo.default_format(), wgpu::TextureFormat::Rgba8Unorm);
}

#[test]
fn explicit_format_overrides_default() {
    let layout = GBufferLayout::empty(wgpu::TextureFormat::Depth24Plus)
        .with_target_format(GBufferTarget::Normal, wgpu::TextureFormat::Rgb10a2Unorm)
        .with_target(GBufferTarget::Albedo);

    assert_eq!(layout.targets()[0].format, wgpu::TextureFormat::Rgb10a2Unorm);
    assert!(layout.validate(&limits()).is_ok());
}

#[test]
fn wgsl_names_are_unique() {
    let mut names: Vec<_> = GBufferTarget::ALL.iter().map(|t| t.wgsl_name()).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), GBufferTarget::ALL.len());
}

// ============================================================================
// Bytes Per Sample
// ============================================================================

#[test]
fn standard_layout_costs_24_bytes() {
    assert_eq!(GBufferLayout::standard().bytes_per_sample().unwrap(), 24);
}

#[test]
fn emissive_fits_default_limit_exactly() {
    let layout = GBufferLayout::standard().with_emissive();
    assert_eq!(layout.bytes_per_sample().unwrap(), 32);
    assert!(layout.validate(&limits()).is_ok());
}

#[test]
fn position_is_aligned_before_adding() {
    // Rgba8Unorm leaves the total at 8, Rgba32Float needs 4-byte alignment
    let layout = GBufferLayout::empty(wgpu::TextureFormat::Depth32Float)
        .with_target_format(GBufferTarget::Albedo, wgpu::TextureFormat::Rgba8Unorm)
        .with_position();
    assert_eq!(layout.bytes_per_sample().unwrap(), 24);

    let layout = GBufferLayout::standard().with_position();
    assert_eq!(layout.bytes_per_sample().unwrap(), 40);
}

#[test]
fn format_costs_match_render_target_table() {
    assert_eq!(target_format_cost(wgpu::TextureFormat::Rgba8Unorm), Some((8, 1)));
    assert_eq!(target_format_cost(wgpu::TextureFormat::Rgba16Float), Some((8, 2)));
    assert_eq!(target_format_cost(wgpu::TextureFormat::Rgb10a2Unorm), Some((8, 4)));
    assert_eq!(target_format_cost(wgpu::TextureFormat::Rgba32Float), Some((16, 4)));
    assert_eq!(target_format_cost(wgpu::TextureFormat::Rgba8UnormSrgb), None);
    assert_eq!(target_format_cost(wgpu::TextureFormat::Depth32Float), None);
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn standard_layout_validates() {
    assert!(GBufferLayout::standard().validate(&limits()).is_ok());
}

#[test]
fn missing_normal_is_rejected() {
    let layout = GBufferLayout::empty(wgpu::TextureFormat::Depth32Float)
        .with_target(GBufferTarget::Albedo)
        .with_target(GBufferTarget::Specular);

    assert!(matches!(
        layout.validate(&limits()),
        Err(UmbraError::InvalidLayout(msg)) if msg.contains("Normal")
    ));
}

#[test]
fn empty_layout_is_rejected() {
    let layout = GBufferLayout::empty(wgpu::TextureFormat::Depth32Float);
    assert!(matches!(layout.validate(&limits()), Err(UmbraError::InvalidLayout(_))));
}

#[test]
fn duplicate_target_is_rejected() {
    let layout = GBufferLayout::standard().with_target(GBufferTarget::Albedo);
    assert!(matches!(
        layout.validate(&limits()),
        Err(UmbraError::InvalidLayout(msg)) if msg.contains("more than once")
    ));
}

#[test]
fn attachment_count_respects_limit() {
    let tight = wgpu::Limits {
        max_color_attachments: 2,
        ..wgpu::Limits::default()
    };
    assert!(matches!(
        GBufferLayout::standard().validate(&tight),
        Err(UmbraError::InvalidLayout(_))
    ));
}

#[test]
fn position_plus_standard_exceeds_default_budget() {
    let layout = GBufferLayout::standard().with_position();
    assert!(matches!(
        layout.validate(&limits()),
        Err(UmbraError::InvalidLayout(msg)) if msg.contains("40 bytes")
    ));

    let raised = wgpu::Limits {
        max_color_attachment_bytes_per_sample: 64,
        ..wgpu::Limits::default()
    };
    assert!(layout.validate(&raised).is_ok());
}

#[test]
fn srgb_target_format_is_rejected() {
    let layout = GBufferLayout::empty(wgpu::TextureFormat::Depth32Float)
        .with_target(GBufferTarget::Normal)
        .with_target_format(GBufferTarget::Albedo, wgpu::TextureFormat::Rgba8UnormSrgb);

    assert!(matches!(
        layout.validate(&limits()),
        Err(UmbraError::UnsupportedFormat {
            target: GBufferTarget::Albedo,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
        })
    ));
}

#[test]
fn color_depth_format_is_rejected() {
    let layout = GBufferLayout::standard().with_depth_format(wgpu::TextureFormat::Rgba8Unorm);
    assert!(matches!(
        layout.validate(&limits()),
        Err(UmbraError::UnsupportedDepthFormat(wgpu::TextureFormat::Rgba8Unorm))
    ));
}

#[test]
fn depth_formats_are_recognised() {
    assert!(is_depth_format(wgpu::TextureFormat::Depth32Float));
    assert!(is_depth_format(wgpu::TextureFormat::Depth24PlusStencil8));
    assert!(!is_depth_format(wgpu::TextureFormat::Stencil8));
    assert!(!is_depth_format(wgpu::TextureFormat::Rgba16Float));
}

// ============================================================================
// Pipeline Derivation
// ============================================================================

#[test]
fn color_target_states_match_layout() {
    let layout = GBufferLayout::standard().with_emissive();
    let states = layout.color_target_states();

    assert_eq!(states.len(), 4);
    for (state, desc) in states.iter().zip(layout.targets()) {
        let state = state.as_ref().unwrap();
        assert_eq!(state.format, desc.format);
        assert!(state.blend.is_none());
        assert_eq!(state.write_mask, wgpu::ColorWrites::ALL);
    }
}

#[test]
fn lighting_entries_are_unfilterable_textures_including_depth() {
    let layout = GBufferLayout::standard();
    let entries = layout.lighting_bind_group_layout_entries();

    assert_eq!(entries.len(), 4);
    for (index, entry) in entries[..3].iter().enumerate() {
        assert_eq!(entry.binding, index as u32);
        assert_eq!(entry.visibility, wgpu::ShaderStages::FRAGMENT);
        assert!(matches!(
            entry.ty,
            wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: false },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            }
        ));
    }

    // Depth is read as plain float so the pipeline also builds on GL.
    let depth = &entries[3];
    assert_eq!(depth.binding, layout.depth_binding());
    assert!(matches!(
        depth.ty,
        wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: false },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        }
    ));
}

// ============================================================================
// Render Size
// ============================================================================

#[test]
fn render_size_within_limit_is_accepted() {
    assert!(validate_render_size(1280, 720, 8192).is_ok());
    assert!(validate_render_size(8192, 1, 8192).is_ok());
}

#[test]
fn zero_render_size_is_rejected() {
    assert!(matches!(
        validate_render_size(0, 720, 8192),
        Err(UmbraError::InvalidRenderSize { width: 0, height: 720, max: 8192 })
    ));
    assert!(validate_render_size(1280, 0, 8192).is_err());
}

#[test]
fn oversized_render_size_is_rejected() {
    assert!(validate_render_size(8193, 720, 8192).is_err());
    assert!(validate_render_size(1280, 9000, 8192).is_err());
}
