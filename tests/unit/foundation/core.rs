use super::*;

#[test]
fn premul_from_straight_rounds() {
    let p = Rgba8Premul::from_straight_rgba(255, 128, 0, 128);
    assert_eq!(p.to_array(), [128, 64, 0, 128]);
    assert_eq!(Rgba8Premul::transparent().to_array(), [0, 0, 0, 0]);
}

#[test]
fn irect_outward_covers_fractional_rect() {
    let r = IRect::from_rect_outward(Rect::new(0.5, 1.2, 3.1, 4.0));
    assert_eq!(r, IRect::new(0, 1, 4, 4));
    assert_eq!(r.width(), 4);
    assert_eq!(r.height(), 3);
}

#[test]
fn irect_intersect_and_union() {
    let a = IRect::new(0, 0, 10, 10);
    let b = IRect::new(5, 5, 20, 20);
    assert_eq!(a.intersect(b), IRect::new(5, 5, 10, 10));
    assert_eq!(a.union(b), IRect::new(0, 0, 20, 20));

    let disjoint = IRect::new(30, 30, 40, 40);
    assert!(a.intersect(disjoint).is_empty());
    assert_eq!(IRect::default().union(a), a);
}

#[test]
fn irect_contains_is_half_open() {
    let r = IRect::from_size(4, 3);
    assert!(r.contains(0, 0));
    assert!(r.contains(3, 2));
    assert!(!r.contains(4, 2));
    assert!(!r.contains(3, 3));
}
