//! Settings Tests
//!
//! Tests for:
//! - Default context and deferred settings
//! - Struct-update overrides
//! - Default G-buffer layout validity under default limits

use umbra::gbuffer::GBufferLayout;
use umbra::settings::{ContextSettings, DeferredSettings};

#[test]
fn context_defaults() {
    let settings = ContextSettings::default();
    assert!(settings.vsync);
    assert!(settings.backends.is_none());
    assert_eq!(settings.power_preference, wgpu::PowerPreference::HighPerformance);
    assert_eq!(settings.required_features, wgpu::Features::empty());
}

#[test]
fn deferred_defaults() {
    let settings = DeferredSettings::default();
    assert_eq!(settings.gbuffer, GBufferLayout::standard());
    assert_eq!(settings.output_format, wgpu::TextureFormat::Bgra8UnormSrgb);
    assert_eq!(settings.clear_color, wgpu::Color::BLACK);
    assert_eq!(settings.initial_object_capacity, 64);
}

#[test]
fn default_layout_validates_against_default_limits() {
    let settings = DeferredSettings::default();
    let limits = ContextSettings::default().required_limits;
    assert!(settings.gbuffer.validate(&limits).is_ok());
}

#[test]
fn overrides_keep_remaining_defaults() {
    let settings = DeferredSettings {
        gbuffer: GBufferLayout::standard().with_emissive(),
        clear_color: wgpu::Color::WHITE,
        ..Default::default()
    };
    assert_eq!(settings.gbuffer.targets().len(), 4);
    assert_eq!(settings.clear_color, wgpu::Color::WHITE);
    assert_eq!(settings.initial_object_capacity, 64);
}
