use super::*;

fn dot(size: u32) -> Surface {
    let mut s = Surface::new(size, size).unwrap();
    let c = (size / 2) as i32;
    s.set_pixel(c, c, [255, 255, 255, 255]);
    s
}

fn alpha_sum(s: &Surface) -> u32 {
    s.data().chunks_exact(4).map(|px| u32::from(px[3])).sum()
}

#[test]
fn zero_deviation_is_identity() {
    let src = dot(7);
    let out = apply(src.clone(), 0.0, 0.0, src.bounds(), &Limits::default()).unwrap();
    assert_eq!(out, src);
}

#[test]
fn negative_deviation_is_an_error() {
    let src = dot(3);
    let err = apply(src.clone(), -1.0, 0.0, src.bounds(), &Limits::default()).unwrap_err();
    assert!(matches!(err, SvgraphError::Filter(_)));
}

#[test]
fn small_sigma_spreads_and_roughly_preserves_energy() {
    let src = dot(11);
    let out = apply(src.clone(), 1.0, 1.0, src.bounds(), &Limits::default()).unwrap();
    let nonzero = out.data().chunks_exact(4).filter(|px| px[3] != 0).count();
    assert!(nonzero > 1);
    assert!((alpha_sum(&out) as i32 - 255).abs() <= 12);
}

#[test]
fn box_path_spreads_and_stays_symmetric() {
    let src = dot(31);
    let out = apply(src.clone(), 3.0, 3.0, src.bounds(), &Limits::default()).unwrap();
    assert!(out.pixel(15, 15)[3] > 0);
    assert_eq!(out.pixel(12, 15)[3], out.pixel(15, 12)[3]);
    assert!(out.pixel(15, 15)[3] >= out.pixel(18, 15)[3]);
}

#[test]
fn one_axis_only_blurs_that_axis() {
    let src = dot(9);
    let out = apply(src.clone(), 1.0, 0.0, src.bounds(), &Limits::default()).unwrap();
    assert!(out.pixel(3, 4)[3] > 0);
    assert_eq!(out.pixel(4, 3)[3], 0);
}

#[test]
fn outside_bounds_stays_transparent() {
    let src = dot(9);
    let bounds = IRect::new(2, 2, 7, 7);
    let out = apply(src, 2.5, 2.5, bounds, &Limits::default()).unwrap();
    assert_eq!(out.pixel(0, 4), [0; 4]);
    assert_eq!(out.pixel(8, 8), [0; 4]);
}

#[test]
fn radius_limit_is_enforced() {
    let limits = Limits {
        max_blur_radius: 4,
        ..Limits::default()
    };
    let src = dot(5);
    let err = apply(src.clone(), 10.0, 10.0, src.bounds(), &limits).unwrap_err();
    assert!(matches!(err, SvgraphError::Limit(_)));
}

#[test]
fn constant_interior_is_preserved_by_kernel() {
    let mut src = Surface::new(9, 9).unwrap();
    src.fill([40, 30, 20, 200]);
    let out = apply(src, 0.8, 0.8, IRect::new(0, 0, 9, 9), &Limits::default()).unwrap();
    assert_eq!(out.pixel(4, 4), [40, 30, 20, 200]);
}
