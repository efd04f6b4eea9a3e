use super::*;

use crate::config::Limits;
use crate::filters::Filter;
use crate::foundation::core::Affine;
use crate::scene::node::{Region, Units};

fn user_filter(w: f64, h: f64) -> Filter {
    let mut f = Filter::new();
    f.region = Region {
        x: 0.0,
        y: 0.0,
        width: w,
        height: h,
        units: Units::UserSpaceOnUse,
    };
    f
}

fn overhead() -> LightSource {
    LightSource::Distant {
        azimuth: 0.0,
        elevation: 90.0,
    }
}

#[test]
fn flat_alpha_has_upright_normal() {
    let mut s = Surface::new(3, 3).unwrap();
    s.fill([0, 0, 0, 255]);
    let n = surface_normal(&s, s.bounds(), 1, 1, 5.0);
    assert_eq!(n, [0.0, 0.0, 1.0]);
}

#[test]
fn corner_normal_uses_two_thirds_factor() {
    let mut s = Surface::new(3, 3).unwrap();
    s.set_pixel(1, 0, [0, 0, 0, 255]);
    let n = surface_normal(&s, s.bounds(), 0, 0, 1.0);
    assert!((n[0] / n[2] + 4.0 / 3.0).abs() < 1e-9);
}

#[test]
fn interior_normal_uses_quarter_factor() {
    let mut s = Surface::new(3, 3).unwrap();
    for y in 0..3 {
        s.set_pixel(2, y, [0, 0, 0, 255]);
    }
    let n = surface_normal(&s, s.bounds(), 1, 1, 1.0);
    // (1 + 2 + 1) / 4 = 1
    assert!((n[0] / n[2] + 1.0).abs() < 1e-9);
    assert!(n[1].abs() < 1e-12);
}

#[test]
fn diffuse_overhead_light_on_flat_surface_is_light_color() {
    let src = Surface::new(4, 4).unwrap();
    let filter = user_filter(4.0, 4.0);
    let limits = Limits::default();
    let ctx = FilterContext::new(&filter, &src, Affine::IDENTITY, None, &limits).unwrap();
    let kind = LightingKind::Diffuse {
        diffuse_constant: 1.0,
    };
    let out = apply(&src, &ctx, &kind, 1.0, Color::WHITE, &overhead(), src.bounds()).unwrap();
    assert_eq!(out.pixel(2, 2), [255, 255, 255, 255]);
}

#[test]
fn specular_alpha_is_max_channel() {
    let src = Surface::new(2, 2).unwrap();
    let filter = user_filter(2.0, 2.0);
    let limits = Limits::default();
    let ctx = FilterContext::new(&filter, &src, Affine::IDENTITY, None, &limits).unwrap();
    let kind = LightingKind::Specular {
        specular_constant: 1.0,
        specular_exponent: 1.0,
    };
    let red = Color::from_rgb8(255, 0, 0);
    let out = apply(&src, &ctx, &kind, 1.0, red, &overhead(), src.bounds()).unwrap();
    assert_eq!(out.pixel(0, 0), [255, 0, 0, 255]);
}

#[test]
fn specular_exponent_out_of_range_is_rejected() {
    let src = Surface::new(2, 2).unwrap();
    let filter = user_filter(2.0, 2.0);
    let limits = Limits::default();
    let ctx = FilterContext::new(&filter, &src, Affine::IDENTITY, None, &limits).unwrap();
    let kind = LightingKind::Specular {
        specular_constant: 1.0,
        specular_exponent: 200.0,
    };
    let err = apply(&src, &ctx, &kind, 1.0, Color::WHITE, &overhead(), src.bounds()).unwrap_err();
    assert!(matches!(err, SvgraphError::Filter(_)));
}

#[test]
fn spot_light_outside_cone_is_dark() {
    let src = Surface::new(8, 1).unwrap();
    let filter = user_filter(8.0, 1.0);
    let limits = Limits::default();
    let ctx = FilterContext::new(&filter, &src, Affine::IDENTITY, None, &limits).unwrap();
    let spot = LightSource::Spot {
        x: 0.0,
        y: 0.0,
        z: 1.0,
        points_at_x: 0.0,
        points_at_y: 0.0,
        points_at_z: 0.0,
        specular_exponent: 1.0,
        limiting_cone_angle: Some(10.0),
    };
    let kind = LightingKind::Diffuse {
        diffuse_constant: 1.0,
    };
    let out = apply(&src, &ctx, &kind, 1.0, Color::WHITE, &spot, src.bounds()).unwrap();
    assert!(out.pixel(0, 0)[0] > 200);
    assert_eq!(out.pixel(7, 0)[0], 0);
}
