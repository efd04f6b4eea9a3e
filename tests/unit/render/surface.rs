use super::*;

#[test]
fn new_surface_is_transparent() {
    let s = Surface::new(3, 2).unwrap();
    assert_eq!(s.data().len(), 24);
    assert!(s.data().iter().all(|&b| b == 0));
}

#[test]
fn out_of_bounds_reads_are_transparent_and_writes_ignored() {
    let mut s = Surface::new(2, 2).unwrap();
    s.set_pixel(5, 0, [1, 2, 3, 4]);
    s.set_pixel(-1, 0, [1, 2, 3, 4]);
    assert_eq!(s.pixel(5, 0), [0; 4]);
    s.set_pixel(1, 1, [9, 9, 9, 9]);
    assert_eq!(s.pixel(1, 1), [9, 9, 9, 9]);
}

#[test]
fn from_parts_checks_length() {
    assert!(Surface::from_premul_rgba8(2, 2, vec![0; 15]).is_err());
    assert!(Surface::from_premul_rgba8(2, 2, vec![0; 16]).is_ok());
}

#[test]
fn straight_conversion_unpremultiplies() {
    let s = Surface::from_premul_rgba8(1, 1, vec![128, 64, 0, 128]).unwrap();
    assert_eq!(s.to_rgba8_straight(), vec![255, 128, 0, 128]);
}

#[test]
fn coverage_scales_all_channels() {
    let mut s = Surface::from_premul_rgba8(2, 1, vec![255, 255, 255, 255, 10, 0, 0, 10]).unwrap();
    s.apply_coverage(&[0, 255]).unwrap();
    assert_eq!(s.data(), &[0, 0, 0, 0, 10, 0, 0, 10]);
    assert!(s.apply_coverage(&[0]).is_err());
}

#[test]
fn clear_outside_keeps_only_the_rect() {
    let mut s = Surface::new(3, 1).unwrap();
    s.fill([1, 1, 1, 1]);
    s.clear_outside(IRect::new(1, 0, 2, 1));
    assert_eq!(s.pixel(0, 0), [0; 4]);
    assert_eq!(s.pixel(1, 0), [1; 4]);
    assert_eq!(s.pixel(2, 0), [0; 4]);
}
