use tracing::debug;

use crate::attr::AspectRatio;
use crate::foundation::core::{Affine, IRect, Rect, Vec2};
use crate::foundation::error::SvgraphResult;
use crate::render::raster::draw_image_bilinear;
use crate::render::surface::Surface;

use super::ImageSource;
use super::context::{FilterContext, FilterEnv};

/// Render an `feImage` source. External images are fitted into `rect` (user space) with
/// `aspect`; element references are rendered with the filtered element's transform.
pub fn apply(
    ctx: &FilterContext<'_>,
    env: &mut dyn FilterEnv,
    source: &ImageSource,
    aspect: AspectRatio,
    rect: Rect,
    bounds: IRect,
) -> SvgraphResult<Surface> {
    match source {
        ImageSource::External(None) => ctx.transparent(),
        ImageSource::External(Some(image)) => {
            let mut out = ctx.transparent()?;
            let (iw, ih) = (f64::from(image.width()), f64::from(image.height()));
            if iw <= 0.0 || ih <= 0.0 || rect.width() <= 0.0 || rect.height() <= 0.0 {
                return Ok(out);
            }
            let (x, y, w, h) = aspect.fit(iw, ih, rect.x0, rect.y0, rect.width(), rect.height());
            let placement = ctx.affine()
                * Affine::translate(Vec2::new(x, y))
                * Affine::scale_non_uniform(w / iw, h / ih);
            draw_image_bilinear(&mut out, image, placement, bounds);
            Ok(out)
        }
        ImageSource::Node(id) => match env.render_node(id, ctx.affine())? {
            Some(mut s) => {
                s.clear_outside(bounds);
                Ok(s)
            }
            None => {
                debug!(id, "feImage reference not found");
                ctx.transparent()
            }
        },
    }
}
