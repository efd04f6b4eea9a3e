use std::collections::HashMap;

use tracing::debug;

use crate::attr::Color;
use crate::config::Limits;
use crate::foundation::core::{Affine, IRect, Rect, Vec2};
use crate::foundation::error::SvgraphResult;
use crate::render::surface::Surface;
use crate::scene::node::{Units, bbox_units_transform};
use crate::transform::affine::{axis_scales, transform_distance};

use super::{Filter, Input, Primitive};

/// Callbacks a filter needs from the renderer that owns it.
pub trait FilterEnv {
    /// Render the element registered as `id` into a canvas-sized surface using `affine` as its
    /// user-to-device transform. `Ok(None)` when the element does not exist.
    fn render_node(&mut self, id: &str, affine: Affine) -> SvgraphResult<Option<Surface>>;
}

/// An env that has nothing to render; `feImage` node references come out transparent.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoNodes;

impl FilterEnv for NoNodes {
    fn render_node(&mut self, _id: &str, _affine: Affine) -> SvgraphResult<Option<Surface>> {
        Ok(None)
    }
}

/// One evaluated primitive: its buffer and the device rectangle it is valid in.
#[derive(Debug, Clone)]
pub struct FilterOutput {
    pub surface: Surface,
    pub bounds: IRect,
}

/// Per-evaluation state of a filter chain.
pub struct FilterContext<'a> {
    source: &'a Surface,
    background: Option<&'a Surface>,
    affine: Affine,
    bbox: Option<Rect>,
    region_user: Rect,
    region: IRect,
    primitive_units: Units,
    fill: Option<Color>,
    stroke: Option<Color>,
    limits: &'a Limits,
    results: HashMap<String, FilterOutput>,
    last: Option<FilterOutput>,
}

impl<'a> FilterContext<'a> {
    /// `None` when the filter region cannot be resolved, i.e. bounding-box units applied to an
    /// element without a usable bounding box.
    pub fn new(
        filter: &Filter,
        source: &'a Surface,
        affine: Affine,
        bbox: Option<Rect>,
        limits: &'a Limits,
    ) -> Option<Self> {
        let region_user = filter.region.resolve(bbox)?;
        let region = IRect::from_rect_outward(affine.transform_rect_bbox(region_user))
            .intersect(source.bounds());
        Some(Self {
            source,
            background: None,
            affine,
            bbox,
            region_user,
            region,
            primitive_units: filter.primitive_units,
            fill: None,
            stroke: None,
            limits,
            results: HashMap::new(),
            last: None,
        })
    }

    pub fn with_background(mut self, background: &'a Surface) -> Self {
        self.background = Some(background);
        self
    }

    pub fn with_paints(mut self, fill: Option<Color>, stroke: Option<Color>) -> Self {
        self.fill = fill;
        self.stroke = stroke;
        self
    }

    pub fn limits(&self) -> &Limits {
        self.limits
    }

    /// Device-space filter region.
    pub fn region(&self) -> IRect {
        self.region
    }

    pub fn affine(&self) -> Affine {
        self.affine
    }

    /// Transform from primitive units to device space.
    pub fn paffine(&self) -> Affine {
        match (self.primitive_units, self.bbox) {
            (Units::ObjectBoundingBox, Some(b)) => self.affine * bbox_units_transform(b),
            _ => self.affine,
        }
    }

    /// Scale a pair of primitive-unit lengths to device pixels along each axis.
    pub fn scale_lengths(&self, x: f64, y: f64) -> (f64, f64) {
        let (sx, sy) = axis_scales(self.paffine());
        (x * sx, y * sy)
    }

    pub fn transform_distance(&self, dx: f64, dy: f64) -> Vec2 {
        transform_distance(self.paffine(), dx, dy)
    }

    /// User-space rectangle of a primitive: its own x/y/width/height where given, the filter
    /// region otherwise. `None` when the resulting size is not positive.
    pub fn subregion_user(&self, prim: &Primitive) -> Option<Rect> {
        let r = self.region_user;
        if prim.x.is_none() && prim.y.is_none() && prim.width.is_none() && prim.height.is_none() {
            return Some(r);
        }
        let (x, y, w, h) = match (self.primitive_units, self.bbox) {
            (Units::ObjectBoundingBox, Some(b)) => (
                prim.x.map(|v| b.x0 + v * b.width()),
                prim.y.map(|v| b.y0 + v * b.height()),
                prim.width.map(|v| v * b.width()),
                prim.height.map(|v| v * b.height()),
            ),
            _ => (prim.x, prim.y, prim.width, prim.height),
        };
        let x = x.unwrap_or(r.x0);
        let y = y.unwrap_or(r.y0);
        let w = w.unwrap_or(r.width());
        let h = h.unwrap_or(r.height());
        if w <= 0.0 || h <= 0.0 {
            return None;
        }
        Some(Rect::new(x, y, x + w, y + h))
    }

    /// Device rectangle of a primitive, always inside the filter region.
    pub fn subregion(&self, prim: &Primitive) -> IRect {
        match self.subregion_user(prim) {
            Some(user) => IRect::from_rect_outward(self.affine.transform_rect_bbox(user))
                .intersect(self.region),
            None => IRect::default(),
        }
    }

    pub fn transparent(&self) -> SvgraphResult<Surface> {
        Surface::new(self.source.width(), self.source.height())
    }

    /// Resolve an input to an owned buffer.
    pub fn input(&self, input: &Input) -> SvgraphResult<Surface> {
        Ok(self.input_with_bounds(input)?.0)
    }

    /// Resolve an input together with the rectangle it is valid in.
    pub fn input_with_bounds(&self, input: &Input) -> SvgraphResult<(Surface, IRect)> {
        match input {
            Input::SourceGraphic => Ok((self.clipped(self.source)?, self.region)),
            Input::SourceAlpha => Ok((alpha_only(&self.clipped(self.source)?), self.region)),
            Input::BackgroundImage => match self.background {
                Some(bg) => Ok((self.clipped(bg)?, self.region)),
                None => Ok((self.transparent()?, self.region)),
            },
            Input::BackgroundAlpha => match self.background {
                Some(bg) => Ok((alpha_only(&self.clipped(bg)?), self.region)),
                None => Ok((self.transparent()?, self.region)),
            },
            Input::FillPaint => Ok((self.flat(self.fill)?, self.region)),
            Input::StrokePaint => Ok((self.flat(self.stroke)?, self.region)),
            Input::Named(name) => match self.results.get(name) {
                Some(out) => Ok((out.surface.clone(), out.bounds)),
                None => {
                    debug!(name, "unknown filter input, using the previous result");
                    self.input_with_bounds(&Input::Previous)
                }
            },
            Input::Previous => match &self.last {
                Some(out) => Ok((out.surface.clone(), out.bounds)),
                None => self.input_with_bounds(&Input::SourceGraphic),
            },
        }
    }

    fn clipped(&self, s: &Surface) -> SvgraphResult<Surface> {
        let mut out = if s.width() == self.source.width() && s.height() == self.source.height() {
            s.clone()
        } else {
            let mut out = self.transparent()?;
            for y in self.region.y0..self.region.y1 {
                for x in self.region.x0..self.region.x1 {
                    out.set_pixel(x, y, s.pixel(x, y));
                }
            }
            out
        };
        out.clear_outside(self.region);
        Ok(out)
    }

    fn flat(&self, color: Option<Color>) -> SvgraphResult<Surface> {
        let mut out = self.transparent()?;
        if let Some(c) = color {
            let px = c.to_rgba8_premul().to_array();
            for y in self.region.y0..self.region.y1 {
                for x in self.region.x0..self.region.x1 {
                    out.set_pixel(x, y, px);
                }
            }
        }
        Ok(out)
    }

    /// Record a primitive's output as the latest result and, if named, under its name.
    pub fn store(&mut self, name: Option<&str>, surface: Surface, bounds: IRect) {
        let out = FilterOutput { surface, bounds };
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            self.results.insert(name.to_string(), out.clone());
        }
        self.last = Some(out);
    }

    /// The chain's final buffer; transparent for an empty chain.
    pub fn take_result(&mut self) -> SvgraphResult<Surface> {
        match self.last.take() {
            Some(out) => Ok(out.surface),
            None => self.transparent(),
        }
    }
}

/// Keep only the alpha channel (black with the source coverage).
pub fn alpha_only(s: &Surface) -> Surface {
    let mut out = s.clone();
    for px in out.data_mut().chunks_exact_mut(4) {
        px[0] = 0;
        px[1] = 0;
        px[2] = 0;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/filters/context.rs"]
mod tests;
