pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

pub(crate) fn unit_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = mul_div255_u8(u16::from(px[0]), a);
        px[1] = mul_div255_u8(u16::from(px[1]), a);
        px[2] = mul_div255_u8(u16::from(px[2]), a);
    }
}

/// Straight-alpha `[0, 1]` channels of a premultiplied pixel.
pub(crate) fn unpremultiply(px: [u8; 4]) -> [f32; 4] {
    let a = f32::from(px[3]) / 255.0;
    if a <= 0.0 {
        return [0.0; 4];
    }
    [
        (f32::from(px[0]) / 255.0 / a).min(1.0),
        (f32::from(px[1]) / 255.0 / a).min(1.0),
        (f32::from(px[2]) / 255.0 / a).min(1.0),
        a,
    ]
}

/// Inverse of [`unpremultiply`]: clamps straight channels and premultiplies.
pub(crate) fn premultiply(c: [f32; 4]) -> [u8; 4] {
    let a = c[3].clamp(0.0, 1.0);
    [
        unit_to_u8(c[0].clamp(0.0, 1.0) * a),
        unit_to_u8(c[1].clamp(0.0, 1.0) * a),
        unit_to_u8(c[2].clamp(0.0, 1.0) * a),
        unit_to_u8(a),
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
