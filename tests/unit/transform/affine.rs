use super::*;
use crate::foundation::core::Point;

fn approx(a: Affine, b: Affine) -> bool {
    a.as_coeffs()
        .iter()
        .zip(b.as_coeffs().iter())
        .all(|(x, y)| (x - y).abs() < 1e-9)
}

#[test]
fn new_is_applied_before_existing() {
    let scale = Affine::scale(2.0);
    let shift = Affine::translate(Vec2::new(10.0, 0.0));
    let t = compose(scale, shift);
    assert_eq!(t * Point::new(1.0, 1.0), Point::new(12.0, 2.0));
}

#[test]
fn compose_is_associative() {
    let a = Affine::rotate(0.3);
    let b = Affine::translate(Vec2::new(4.0, -2.0));
    let c = Affine::scale_non_uniform(2.0, 0.5);
    assert!(approx(
        compose(a, compose(b, c)),
        compose(compose(a, b), c)
    ));
}

#[test]
fn compose_is_not_commutative() {
    let a = Affine::scale(2.0);
    let b = Affine::translate(Vec2::new(1.0, 0.0));
    assert!(!approx(compose(a, b), compose(b, a)));
}

#[test]
fn scale_helpers() {
    let t = Affine::scale_non_uniform(2.0, 3.0);
    assert_eq!(axis_scales(t), (2.0, 3.0));
    assert_eq!(transform_distance(t, 1.0, 1.0), Vec2::new(2.0, 3.0));
    assert!((mean_scale(t) - 6.0f64.sqrt()).abs() < 1e-12);
}
