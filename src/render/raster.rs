//! The leaf rasterizing capability consumed by the render pass.

use crate::attr::Color;
use crate::foundation::core::{Affine, BezPath, IRect, Point};
use crate::foundation::error::{SvgraphError, SvgraphResult};
use crate::render::composite::{over, over_in_place};
use crate::render::surface::Surface;
use crate::scene::state::{FillRule, LineCap, LineJoin};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f64,
    pub cap: LineCap,
    pub join: LineJoin,
    pub miter_limit: f64,
}

/// Resolved paint of one leaf shape. `None` parts are not painted.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PathStyle {
    pub fill: Option<(Color, FillRule)>,
    pub stroke: Option<StrokeStyle>,
}

/// Draws leaf geometry into premultiplied surfaces.
///
/// Only [`Rasterizer::draw_path`] is required; the other operations have CPU defaults.
pub trait Rasterizer {
    fn allocate_surface(&mut self, width: u32, height: u32) -> SvgraphResult<Surface> {
        Surface::new(width, height)
    }

    /// Fill then stroke `path` (user space) mapped by `transform`, touching only pixels in
    /// `clip`.
    fn draw_path(
        &mut self,
        surface: &mut Surface,
        path: &BezPath,
        transform: Affine,
        style: &PathStyle,
        clip: IRect,
    ) -> SvgraphResult<()>;

    /// Draw `image` whose pixel grid is mapped to device space by `transform`.
    fn draw_image(
        &mut self,
        surface: &mut Surface,
        image: &Surface,
        transform: Affine,
        clip: IRect,
    ) -> SvgraphResult<()> {
        draw_image_bilinear(surface, image, transform, clip);
        Ok(())
    }

    fn composite(
        &mut self,
        dst: &mut Surface,
        src: &Surface,
        clip: IRect,
        opacity: f32,
    ) -> SvgraphResult<()> {
        over_in_place(dst, src, clip, opacity)
    }
}

/// Inverse-map every device pixel in `clip` into `image` and composite the bilinear sample.
pub fn draw_image_bilinear(dst: &mut Surface, image: &Surface, transform: Affine, clip: IRect) {
    if image.width() == 0 || image.height() == 0 || transform.determinant() == 0.0 {
        return;
    }
    let inverse = transform.inverse();
    let image_rect = IRect::from_size(image.width(), image.height()).to_rect();
    let device = IRect::from_rect_outward(transform.transform_rect_bbox(image_rect));
    let area = clip.intersect(device).intersect(dst.bounds());
    for y in area.y0..area.y1 {
        for x in area.x0..area.x1 {
            let p = inverse * Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            if p.x < 0.0 || p.y < 0.0 || p.x >= image_rect.x1 || p.y >= image_rect.y1 {
                continue;
            }
            let src = sample_bilinear(image, p.x - 0.5, p.y - 0.5);
            let out = over(dst.pixel(x, y), src, 1.0);
            dst.set_pixel(x, y, out);
        }
    }
}

fn sample_bilinear(image: &Surface, x: f64, y: f64) -> [u8; 4] {
    let max_x = image.width() as i32 - 1;
    let max_y = image.height() as i32 - 1;
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let (x0, y0) = (x0 as i32, y0 as i32);
    let at = |xx: i32, yy: i32| image.pixel(xx.clamp(0, max_x), yy.clamp(0, max_y));
    let (p00, p10, p01, p11) = (at(x0, y0), at(x0 + 1, y0), at(x0, y0 + 1), at(x0 + 1, y0 + 1));
    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = f64::from(p00[c]) * (1.0 - fx) + f64::from(p10[c]) * fx;
        let bottom = f64::from(p01[c]) * (1.0 - fx) + f64::from(p11[c]) * fx;
        out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    out
}

/// [`Rasterizer`] backed by `vello_cpu`.
#[derive(Default)]
pub struct VelloRasterizer {
    scratch: Option<vello_cpu::Pixmap>,
}

impl std::fmt::Debug for VelloRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VelloRasterizer")
            .field("has_scratch", &self.scratch.is_some())
            .finish()
    }
}

impl VelloRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn render_ctx(surface: &Surface) -> SvgraphResult<(vello_cpu::RenderContext, u16, u16)> {
        let w: u16 = surface
            .width()
            .try_into()
            .map_err(|_| SvgraphError::limit("surface width exceeds u16"))?;
        let h: u16 = surface
            .height()
            .try_into()
            .map_err(|_| SvgraphError::limit("surface height exceeds u16"))?;
        Ok((vello_cpu::RenderContext::new(w, h), w, h))
    }

    fn flush_into(
        &mut self,
        mut ctx: vello_cpu::RenderContext,
        w: u16,
        h: u16,
        surface: &mut Surface,
        clip: IRect,
    ) -> SvgraphResult<()> {
        let mut pixmap = match self.scratch.take() {
            Some(p) if p.width() == w && p.height() == h => p,
            _ => vello_cpu::Pixmap::new(w, h),
        };
        pixmap.data_as_u8_slice_mut().fill(0);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        let layer = Surface::from_premul_rgba8(
            u32::from(w),
            u32::from(h),
            pixmap.data_as_u8_slice().to_vec(),
        )?;
        self.scratch = Some(pixmap);
        over_in_place(surface, &layer, clip, 1.0)
    }
}

impl Rasterizer for VelloRasterizer {
    fn draw_path(
        &mut self,
        surface: &mut Surface,
        path: &BezPath,
        transform: Affine,
        style: &PathStyle,
        clip: IRect,
    ) -> SvgraphResult<()> {
        if clip.intersect(surface.bounds()).is_empty() {
            return Ok(());
        }
        let (mut ctx, w, h) = Self::render_ctx(surface)?;
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(affine_to_cpu(transform));
        let cpu_path = bezpath_to_cpu(path);

        if let Some((color, rule)) = style.fill {
            ctx.set_fill_rule(match rule {
                FillRule::NonZero => vello_cpu::peniko::Fill::NonZero,
                FillRule::EvenOdd => vello_cpu::peniko::Fill::EvenOdd,
            });
            ctx.set_paint(color_to_cpu(color));
            ctx.fill_path(&cpu_path);
        }
        if let Some(stroke) = style.stroke
            && stroke.width > 0.0
        {
            ctx.set_stroke(stroke_to_cpu(&stroke));
            ctx.set_paint(color_to_cpu(stroke.color));
            ctx.stroke_path(&cpu_path);
        }
        self.flush_into(ctx, w, h, surface, clip)
    }

    fn draw_image(
        &mut self,
        surface: &mut Surface,
        image: &Surface,
        transform: Affine,
        clip: IRect,
    ) -> SvgraphResult<()> {
        if clip.intersect(surface.bounds()).is_empty() {
            return Ok(());
        }
        let pixmap = surface_to_pixmap(image)?;
        let (mut ctx, w, h) = Self::render_ctx(surface)?;
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(affine_to_cpu(transform));
        ctx.set_paint(vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(std::sync::Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        });
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(image.width()),
            f64::from(image.height()),
        ));
        self.flush_into(ctx, w, h, surface, clip)
    }
}

fn color_to_cpu(c: Color) -> vello_cpu::peniko::Color {
    let [r, g, b, a] = c.to_rgba8_straight();
    vello_cpu::peniko::Color::from_rgba8(r, g, b, a)
}

fn stroke_to_cpu(s: &StrokeStyle) -> vello_cpu::kurbo::Stroke {
    use vello_cpu::kurbo::{Cap, Join, Stroke};

    let cap = match s.cap {
        LineCap::Butt => Cap::Butt,
        LineCap::Round => Cap::Round,
        LineCap::Square => Cap::Square,
    };
    let join = match s.join {
        LineJoin::Miter => Join::Miter,
        LineJoin::Round => Join::Round,
        LineJoin::Bevel => Join::Bevel,
    };
    Stroke::new(s.width)
        .with_caps(cap)
        .with_join(join)
        .with_miter_limit(s.miter_limit)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn surface_to_pixmap(s: &Surface) -> SvgraphResult<vello_cpu::Pixmap> {
    let w: u16 = s
        .width()
        .try_into()
        .map_err(|_| SvgraphError::limit("image width exceeds u16"))?;
    let h: u16 = s
        .height()
        .try_into()
        .map_err(|_| SvgraphError::limit("image height exceeds u16"))?;

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(s.width() as usize * s.height() as usize);
    for px in s.data().chunks_exact(4) {
        may_have_opacities |= px[3] != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        });
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
