use crate::foundation::core::IRect;
use crate::foundation::error::SvgraphResult;
use crate::render::surface::Surface;

/// Repeat the `tile` rectangle of `input` across `bounds`.
pub fn apply(input: &Surface, tile: IRect, bounds: IRect) -> SvgraphResult<Surface> {
    let mut out = Surface::new(input.width(), input.height())?;
    let tile = tile.intersect(input.bounds());
    if tile.is_empty() {
        return Ok(out);
    }
    let bounds = bounds.intersect(out.bounds());
    for y in bounds.y0..bounds.y1 {
        let sy = tile.y0 + (y - tile.y0).rem_euclid(tile.height());
        for x in bounds.x0..bounds.x1 {
            let sx = tile.x0 + (x - tile.x0).rem_euclid(tile.width());
            out.set_pixel(x, y, input.pixel(sx, sy));
        }
    }
    Ok(out)
}
