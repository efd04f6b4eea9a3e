use crate::foundation::core::IRect;
use crate::foundation::error::SvgraphResult;
use crate::render::surface::Surface;

/// New surface sized like `a` whose pixels inside `bounds` are `f(a, b)`.
pub(crate) fn map2(
    a: &Surface,
    b: &Surface,
    bounds: IRect,
    mut f: impl FnMut([u8; 4], [u8; 4]) -> [u8; 4],
) -> SvgraphResult<Surface> {
    let mut out = Surface::new(a.width(), a.height())?;
    let bounds = bounds.intersect(a.bounds());
    for y in bounds.y0..bounds.y1 {
        for x in bounds.x0..bounds.x1 {
            out.set_pixel(x, y, f(a.pixel(x, y), b.pixel(x, y)));
        }
    }
    Ok(out)
}

/// Rewrite the pixels of `s` inside `bounds` in place and clear the rest.
pub(crate) fn map_in_place(
    mut s: Surface,
    bounds: IRect,
    mut f: impl FnMut([u8; 4]) -> [u8; 4],
) -> Surface {
    let bounds = bounds.intersect(s.bounds());
    for y in bounds.y0..bounds.y1 {
        for x in bounds.x0..bounds.x1 {
            let px = f(s.pixel(x, y));
            s.set_pixel(x, y, px);
        }
    }
    s.clear_outside(bounds);
    s
}

#[inline]
pub(crate) fn to_unit(px: [u8; 4]) -> [f64; 4] {
    px.map(|c| f64::from(c) / 255.0)
}

#[inline]
pub(crate) fn from_unit(c: [f64; 4]) -> [u8; 4] {
    c.map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
}

/// Clamp premultiplied channels so that no color exceeds alpha.
#[inline]
pub(crate) fn clamp_premul(mut px: [u8; 4]) -> [u8; 4] {
    for i in 0..3 {
        px[i] = px[i].min(px[3]);
    }
    px
}
