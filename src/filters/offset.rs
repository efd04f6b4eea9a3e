use crate::foundation::error::SvgraphResult;
use crate::render::surface::Surface;

/// Translate `input` by a device-space distance, rounded to whole pixels.
pub fn apply(input: &Surface, dx: f64, dy: f64) -> SvgraphResult<Surface> {
    let (ox, oy) = (dx.round() as i32, dy.round() as i32);
    if ox == 0 && oy == 0 {
        return Ok(input.clone());
    }
    let mut out = Surface::new(input.width(), input.height())?;
    for y in 0..input.height() as i32 {
        for x in 0..input.width() as i32 {
            out.set_pixel(x, y, input.pixel(x - ox, y - oy));
        }
    }
    Ok(out)
}
