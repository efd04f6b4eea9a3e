//! Pixel compositing on premultiplied RGBA8 buffers.

use crate::foundation::core::IRect;
use crate::foundation::error::{SvgraphError, SvgraphResult};
use crate::foundation::math::{mul_div255_u8, mul_div255_u16};
use crate::render::surface::Surface;

pub type PremulRgba8 = [u8; 4];

/// Source-over with a group opacity in `[0, 1]`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255_u16(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - sa;

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255_u16(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255_u16(u16::from(src[i]), op);
        let dc = mul_div255_u16(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

/// Composite `src` over `dst` for every pixel inside `clip`.
pub fn over_in_place(
    dst: &mut Surface,
    src: &Surface,
    clip: IRect,
    opacity: f32,
) -> SvgraphResult<()> {
    if dst.width() != src.width() || dst.height() != src.height() {
        return Err(SvgraphError::render(
            "over_in_place expects equally sized surfaces",
        ));
    }
    let clip = clip.intersect(dst.bounds());
    if clip.is_empty() {
        return Ok(());
    }
    let stride = dst.width() as usize * 4;
    let (x0, x1) = (clip.x0 as usize * 4, clip.x1 as usize * 4);
    let src = src.data();
    let dst = dst.data_mut();
    for y in clip.y0 as usize..clip.y1 as usize {
        let row = y * stride;
        for (d, s) in dst[row + x0..row + x1]
            .chunks_exact_mut(4)
            .zip(src[row + x0..row + x1].chunks_exact(4))
        {
            let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
            d.copy_from_slice(&out);
        }
    }
    Ok(())
}

/// Scale every pixel of `dst` by the alpha of the same pixel in `mask`.
pub fn mask_by_alpha(dst: &mut Surface, mask: &Surface) {
    for (d, m) in dst.data_mut().chunks_exact_mut(4).zip(mask.data().chunks_exact(4)) {
        let a = u16::from(m[3]);
        for c in d.iter_mut() {
            *c = mul_div255_u8(u16::from(*c), a);
        }
    }
}

/// Replace each pixel's alpha with its luminance (premultiplied channels, so coverage is already
/// folded in) and zero the colour channels. Used to turn rendered mask content into a mask.
pub fn luminance_to_alpha(s: &mut Surface) {
    for px in s.data_mut().chunks_exact_mut(4) {
        let l = 0.2125 * f32::from(px[0]) + 0.7154 * f32::from(px[1]) + 0.0721 * f32::from(px[2]);
        px[3] = l.round().clamp(0.0, 255.0) as u8;
        px[0] = 0;
        px[1] = 0;
        px[2] = 0;
    }
}

fn add_sat_u8(a: u16, b: u16) -> u8 {
    (a + b).min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
