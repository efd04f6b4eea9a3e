use super::*;

#[test]
fn identity_is_noop() {
    let m = ColorMatrixKind::IDENTITY;
    for px in [[255, 0, 0, 255], [0, 0, 0, 0], [64, 32, 16, 128]] {
        assert_eq!(transform_pixel(&m, px), px);
    }
}

#[test]
fn wrong_value_count_falls_back_to_identity() {
    let k = ColorMatrixKind::from_type_and_values(Some("matrix"), &[1.0, 2.0]);
    assert_eq!(k.matrix(), ColorMatrixKind::IDENTITY);
}

#[test]
fn saturate_zero_is_greyscale() {
    let k = ColorMatrixKind::from_type_and_values(Some("saturate"), &[0.0]);
    let out = transform_pixel(&k.matrix(), [255, 0, 0, 255]);
    assert_eq!(out[0], out[1]);
    assert_eq!(out[1], out[2]);
    assert_eq!(out[3], 255);
}

#[test]
fn saturate_one_and_hue_zero_are_identity() {
    let px = [200, 100, 50, 255];
    let sat = ColorMatrixKind::Saturate(1.0).matrix();
    let hue = ColorMatrixKind::HueRotate(0.0).matrix();
    assert_eq!(transform_pixel(&sat, px), px);
    assert_eq!(transform_pixel(&hue, px), px);
}

#[test]
fn luminance_to_alpha_of_white_is_opaque_black() {
    let m = ColorMatrixKind::LuminanceToAlpha.matrix();
    assert_eq!(transform_pixel(&m, [255, 255, 255, 255]), [0, 0, 0, 255]);
    assert_eq!(transform_pixel(&m, [0, 0, 0, 255]), [0, 0, 0, 0]);
}

#[test]
fn apply_clears_outside_bounds() {
    let mut s = Surface::new(2, 1).unwrap();
    s.fill([255, 255, 255, 255]);
    let out = apply(s, &ColorMatrixKind::Saturate(1.0), IRect::new(0, 0, 1, 1)).unwrap();
    assert_eq!(out.pixel(0, 0), [255, 255, 255, 255]);
    assert_eq!(out.pixel(1, 0), [0; 4]);
}
