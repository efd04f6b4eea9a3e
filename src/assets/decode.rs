use anyhow::Context;

use crate::foundation::error::{SvgraphError, SvgraphResult};
use crate::foundation::math::premultiply_rgba8_in_place;
use crate::render::surface::Surface;

/// Raster size cap for embedded vector images.
const MAX_SVG_DIM: u32 = 16_384;

/// Decode encoded image bytes and convert to a premultiplied surface.
pub fn decode_image(bytes: &[u8]) -> SvgraphResult<Surface> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);
    Surface::from_premul_rgba8(width, height, rgba8_premul)
}

/// Parse SVG bytes and rasterize them at their intrinsic size.
pub fn decode_svg(bytes: &[u8]) -> SvgraphResult<Surface> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    rasterize_svg(&tree)
}

fn rasterize_svg(tree: &usvg::Tree) -> SvgraphResult<Surface> {
    fn to_px(v: f32) -> SvgraphResult<u32> {
        if !v.is_finite() || v <= 0.0 {
            return Err(SvgraphError::render("svg has invalid width/height"));
        }
        Ok((v.ceil() as u32).max(1))
    }

    let size = tree.size();
    let width = to_px(size.width())?;
    let height = to_px(size.height())?;
    if width > MAX_SVG_DIM || height > MAX_SVG_DIM {
        return Err(SvgraphError::limit(format!(
            "svg raster size too large: {width}x{height} (max {MAX_SVG_DIM}x{MAX_SVG_DIM})"
        )));
    }

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| SvgraphError::render("failed to allocate svg pixmap"))?;
    let sx = (width as f32) / size.width();
    let sy = (height as f32) / size.height();
    resvg::render(
        tree,
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );
    Surface::from_premul_rgba8(width, height, pixmap.data().to_vec())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
pub(crate) mod tests;
