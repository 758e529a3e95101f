//! Lighting Tests
//!
//! Tests for:
//! - Attenuation coefficients and falloff
//! - Light constructors (direction normalisation, cone ordering)
//! - GPU packing of each light kind
//! - LightSet capacity and uniform packing
//! - DebugView ids and target requirements

use std::f32::consts::FRAC_PI_2;

use glam::Vec3;

use umbra::errors::UmbraError;
use umbra::gbuffer::GBufferTarget;
use umbra::light::{Attenuation, DebugView, Light, LightKind, LightSet, MAX_LIGHTS};

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn approx_vec3(a: [f32; 3], b: Vec3) -> bool {
    Vec3::from_array(a).abs_diff_eq(b, EPSILON)
}

// ============================================================================
// Attenuation
// ============================================================================

#[test]
fn attenuation_from_range_coefficients() {
    let att = Attenuation::from_range(10.0);
    assert!(approx(att.constant, 1.0));
    assert!(approx(att.linear, 0.45));
    assert!(approx(att.quadratic, 0.75));
}

#[test]
fn attenuation_factor_is_one_at_source() {
    let att = Attenuation::from_range(25.0);
    assert!(approx(att.factor(0.0), 1.0));
}

#[test]
fn attenuation_at_range_is_one_over_80_5() {
    for range in [1.0, 10.0, 42.0, 250.0] {
        let f = Attenuation::from_range(range).factor(range);
        assert!(approx(f, 1.0 / (1.0 + 4.5 + 75.0)), "range {range}: got {f}");
    }
}

#[test]
fn attenuation_decreases_with_distance() {
    let att = Attenuation::from_range(20.0);
    let mut previous = att.factor(0.0);
    for step in 1..20 {
        let f = att.factor(step as f32);
        assert!(f < previous);
        previous = f;
    }
}

#[test]
fn non_positive_range_disables_falloff() {
    assert_eq!(Attenuation::from_range(0.0), Attenuation::default());
    assert_eq!(Attenuation::from_range(-5.0), Attenuation::default());
    assert!(approx(Attenuation::default().factor(1000.0), 1.0));
}

// ============================================================================
// Constructors
// ============================================================================

#[test]
fn directional_light_normalizes_direction() {
    let light = Light::directional(Vec3::new(0.0, -4.0, 0.0), Vec3::ONE, 1.0);
    match light.kind {
        LightKind::Directional { direction } => {
            assert!(direction.abs_diff_eq(Vec3::NEG_Y, EPSILON));
        }
        other => panic!("unexpected kind {other:?}"),
    }
}

#[test]
fn zero_direction_falls_back_to_down() {
    let light = Light::directional(Vec3::ZERO, Vec3::ONE, 1.0);
    assert!(matches!(
        light.kind,
        LightKind::Directional { direction } if direction == Vec3::NEG_Y
    ));
}

#[test]
fn spot_cones_are_reordered() {
    let light = Light::spot(Vec3::ZERO, Vec3::NEG_Y, 10.0, 0.8, 0.3, Vec3::ONE, 1.0);
    match light.kind {
        LightKind::Spot {
            inner_cone,
            outer_cone,
            ..
        } => {
            assert!(approx(inner_cone, 0.3));
            assert!(approx(outer_cone, 0.8));
        }
        other => panic!("unexpected kind {other:?}"),
    }
}

#[test]
fn spot_outer_cone_is_clamped_to_hemisphere() {
    let light = Light::spot(Vec3::ZERO, Vec3::NEG_Y, 10.0, 0.2, 3.0, Vec3::ONE, 1.0);
    match light.kind {
        LightKind::Spot { outer_cone, .. } => assert!(approx(outer_cone, FRAC_PI_2)),
        other => panic!("unexpected kind {other:?}"),
    }
}

// ============================================================================
// GPU Packing
// ============================================================================

#[test]
fn directional_packs_kind_and_direction() {
    let gpu = Light::directional(Vec3::new(1.0, -1.0, 0.0), Vec3::new(1.0, 0.5, 0.25), 2.0).to_gpu();

    assert_eq!(gpu.kind, 0);
    assert!(approx_vec3(gpu.direction, Vec3::new(1.0, -1.0, 0.0).normalize()));
    assert_eq!(gpu.color, [1.0, 0.5, 0.25]);
    assert!(approx(gpu.intensity, 2.0));
    assert_eq!(gpu.attenuation, [1.0, 0.0, 0.0]);
}

#[test]
fn point_packs_position_and_attenuation() {
    let gpu = Light::point(Vec3::new(1.0, 2.0, 3.0), 10.0, Vec3::ONE, 1.0).to_gpu();

    assert_eq!(gpu.kind, 1);
    assert_eq!(gpu.position, [1.0, 2.0, 3.0]);
    assert!(approx(gpu.attenuation[0], 1.0));
    assert!(approx(gpu.attenuation[1], 0.45));
    assert!(approx(gpu.attenuation[2], 0.75));
}

#[test]
fn spot_packs_cone_cosines() {
    let gpu = Light::spot(Vec3::Y, Vec3::NEG_Y, 10.0, 0.2, 0.4, Vec3::ONE, 1.0).to_gpu();

    assert_eq!(gpu.kind, 2);
    assert!(approx(gpu.inner_cos, 0.2f32.cos()));
    assert!(approx(gpu.outer_cos, 0.4f32.cos()));
    assert!(gpu.outer_cos < gpu.inner_cos);
}

#[test]
fn equal_spot_cones_keep_a_nonempty_edge() {
    let gpu = Light::spot(Vec3::Y, Vec3::NEG_Y, 10.0, 0.3, 0.3, Vec3::ONE, 1.0).to_gpu();
    assert!(gpu.outer_cos < gpu.inner_cos);
}

// ============================================================================
// LightSet
// ============================================================================

#[test]
fn light_set_accepts_up_to_max_lights() {
    let mut set = LightSet::new(Vec3::splat(0.1));
    for i in 0..MAX_LIGHTS {
        set.push(Light::point(Vec3::X * i as f32, 5.0, Vec3::ONE, 1.0))
            .unwrap();
    }
    assert_eq!(set.len(), MAX_LIGHTS);

    let overflow = set.push(Light::directional(Vec3::NEG_Y, Vec3::ONE, 1.0));
    assert!(matches!(overflow, Err(UmbraError::TooManyLights { max: MAX_LIGHTS })));
    assert_eq!(set.len(), MAX_LIGHTS);
}

#[test]
fn light_set_clear_empties() {
    let mut set = LightSet::default();
    set.push(Light::directional(Vec3::NEG_Y, Vec3::ONE, 1.0)).unwrap();
    assert!(!set.is_empty());
    set.clear();
    assert!(set.is_empty());
}

#[test]
fn to_uniforms_packs_header_and_lights() {
    let mut set = LightSet::new(Vec3::new(0.1, 0.2, 0.3));
    set.push(Light::directional(Vec3::NEG_Y, Vec3::ONE, 1.0)).unwrap();
    set.push(Light::point(Vec3::ZERO, 10.0, Vec3::ONE, 3.0)).unwrap();

    let uniforms = set.to_uniforms(DebugView::Normal);

    assert_eq!(uniforms.ambient, [0.1, 0.2, 0.3, 1.0]);
    assert_eq!(uniforms.light_count, 2);
    assert_eq!(uniforms.debug_view, DebugView::Normal.as_u32());
    assert_eq!(uniforms.lights[0].kind, 0);
    assert_eq!(uniforms.lights[1].kind, 1);
    assert!(approx(uniforms.lights[1].intensity, 3.0));
    // unused slots stay zeroed
    assert_eq!(uniforms.lights[2].intensity, 0.0);
}

#[test]
fn lights_mut_edits_in_place() {
    let mut set = LightSet::default();
    set.push(Light::point(Vec3::ZERO, 10.0, Vec3::ONE, 1.0)).unwrap();
    set.lights_mut()[0].intensity = 5.0;
    assert!(approx(set.lights()[0].intensity, 5.0));
}

// ============================================================================
// DebugView
// ============================================================================

#[test]
fn debug_view_ids_are_stable() {
    let views = [
        DebugView::Lit,
        DebugView::Position,
        DebugView::Normal,
        DebugView::Albedo,
        DebugView::Specular,
        DebugView::Emissive,
        DebugView::Depth,
    ];
    for (id, view) in views.into_iter().enumerate() {
        assert_eq!(view.as_u32(), id as u32);
    }
    assert_eq!(DebugView::default(), DebugView::Lit);
}

#[test]
fn debug_view_required_targets() {
    assert_eq!(DebugView::Lit.required_target(), None);
    assert_eq!(DebugView::Depth.required_target(), None);
    // reconstructed from depth when absent
    assert_eq!(DebugView::Position.required_target(), None);
    assert_eq!(DebugView::Emissive.required_target(), Some(GBufferTarget::Emissive));
    assert_eq!(DebugView::Specular.required_target(), Some(GBufferTarget::Specular));
}
