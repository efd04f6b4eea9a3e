use super::*;
use crate::foundation::core::Point;

fn close(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
}

#[test]
fn list_applies_rightmost_first() {
    let t = parse_transform("translate(10, 0) scale(2)").unwrap();
    assert!(close(t * Point::new(1.0, 1.0), Point::new(12.0, 2.0)));
}

#[test]
fn rotate_about_center_keeps_center_fixed() {
    let t = parse_transform("rotate(90 5 5)").unwrap();
    assert!(close(t * Point::new(5.0, 5.0), Point::new(5.0, 5.0)));
    assert!(close(t * Point::new(6.0, 5.0), Point::new(5.0, 6.0)));
}

#[test]
fn matrix_and_skew_forms() {
    let m = parse_transform("matrix(1 0 0 1 3 4)").unwrap();
    assert_eq!(m, Affine::translate(Vec2::new(3.0, 4.0)));
    let k = parse_transform("skewX(45)").unwrap();
    assert!(close(k * Point::new(0.0, 1.0), Point::new(1.0, 1.0)));
}

#[test]
fn malformed_lists_are_rejected() {
    assert_eq!(parse_transform("translate(1,2,3)"), None);
    assert_eq!(parse_transform("wobble(1)"), None);
    assert_eq!(parse_transform("scale(2"), None);
    assert_eq!(parse_transform(""), Some(Affine::IDENTITY));
}
