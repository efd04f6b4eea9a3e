use super::*;

#[test]
fn half_opacity_red_over_transparent() {
    let out = over([0, 0, 0, 0], [255, 0, 0, 255], 0.5);
    assert_eq!(out, [128, 0, 0, 128]);
}

#[test]
fn opaque_src_replaces_dst() {
    assert_eq!(over([0, 0, 255, 255], [255, 0, 0, 255], 1.0), [255, 0, 0, 255]);
}

#[test]
fn zero_opacity_or_transparent_src_is_noop() {
    let dst = [10, 20, 30, 40];
    assert_eq!(over(dst, [255, 255, 255, 255], 0.0), dst);
    assert_eq!(over(dst, [0, 0, 0, 0], 1.0), dst);
}

#[test]
fn over_in_place_respects_clip() {
    let mut dst = Surface::new(4, 1).unwrap();
    let mut src = Surface::new(4, 1).unwrap();
    src.fill([0, 255, 0, 255]);
    over_in_place(&mut dst, &src, IRect::new(1, 0, 3, 1), 1.0).unwrap();
    assert_eq!(dst.pixel(0, 0), [0; 4]);
    assert_eq!(dst.pixel(1, 0), [0, 255, 0, 255]);
    assert_eq!(dst.pixel(2, 0), [0, 255, 0, 255]);
    assert_eq!(dst.pixel(3, 0), [0; 4]);
}

#[test]
fn over_in_place_rejects_mismatched_sizes() {
    let mut dst = Surface::new(2, 2).unwrap();
    let src = Surface::new(3, 2).unwrap();
    let clip = dst.bounds();
    assert!(over_in_place(&mut dst, &src, clip, 1.0).is_err());
}

#[test]
fn luminance_of_white_is_opaque_and_black_is_clear() {
    let mut s = Surface::new(3, 1).unwrap();
    s.set_pixel(0, 0, [255, 255, 255, 255]);
    s.set_pixel(1, 0, [0, 0, 0, 255]);
    s.set_pixel(2, 0, [128, 128, 128, 128]);
    luminance_to_alpha(&mut s);
    assert_eq!(s.pixel(0, 0), [0, 0, 0, 255]);
    assert_eq!(s.pixel(1, 0), [0, 0, 0, 0]);
    assert_eq!(s.pixel(2, 0), [0, 0, 0, 128]);
}
