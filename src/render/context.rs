//! Compositing context: the discrete-layer stack, the effective-state stack and the reference
//! acquisition stack used while walking a document.

use tracing::debug;

use crate::attr::Color;
use crate::config::Options;
use crate::filters::{FilterContext, FilterEnv, apply_filter};
use crate::foundation::core::{Affine, BezPath, IRect, Rect};
use crate::foundation::error::{SvgraphError, SvgraphResult};
use crate::render::composite::{luminance_to_alpha, mask_by_alpha};
use crate::render::pool::SurfacePool;
use crate::render::raster::{PathStyle, Rasterizer};
use crate::render::surface::Surface;
use crate::scene::document::Document;
use crate::scene::node::{NodeId, Units, bbox_units_transform};
use crate::scene::state::State;

/// Counters collected during one render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct RenderStats {
    pub layers_pushed: usize,
    pub layers_popped: usize,
    pub max_layer_depth: usize,
    /// Reference edges skipped because they closed a cycle, exceeded the chain limit or ran
    /// past the instance budget.
    pub references_broken: usize,
    /// References acquired so far, counted against `max_reference_instances`.
    pub reference_instances: usize,
    pub filters_applied: usize,
}

/// What a discrete layer applies to its content when it is popped.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerEffects {
    pub opacity: f64,
    pub filter: Option<String>,
    pub clip_path: Option<String>,
    pub mask: Option<String>,
    /// Bounds of the layer content in its own user space, for bounding-box units.
    pub bbox: Option<Rect>,
    /// User-to-device transform of the layer content.
    pub affine: Affine,
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
}

impl Default for LayerEffects {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            filter: None,
            clip_path: None,
            mask: None,
            bbox: None,
            affine: Affine::IDENTITY,
            fill: None,
            stroke: None,
        }
    }
}

impl LayerEffects {
    pub fn from_state(state: &State, bbox: Option<Rect>) -> Self {
        Self {
            opacity: state.opacity,
            filter: state.filter.clone(),
            clip_path: state.clip_path.clone(),
            mask: state.mask.clone(),
            bbox,
            affine: state.affine,
            fill: state.fill_color(),
            stroke: state.stroke_color(),
        }
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    /// No offscreen surface is needed: children draw straight into the parent target.
    pub fn is_passthrough(&self) -> bool {
        self.opacity >= 1.0 && self.filter.is_none() && self.clip_path.is_none() && self.mask.is_none()
    }
}

struct Layer {
    /// `None` for pass-through layers.
    surface: Option<Surface>,
    clip: IRect,
    effects: LayerEffects,
    /// Rendered for a caller (feImage, clip or mask content) instead of composited on pop.
    isolated: bool,
}

/// Render-time state for one document render.
pub struct DrawingContext<'a> {
    doc: &'a Document,
    opts: &'a Options,
    rasterizer: &'a mut dyn Rasterizer,
    pool: SurfacePool,
    width: u32,
    height: u32,
    layers: Vec<Layer>,
    states: Vec<State>,
    acquired: Vec<NodeId>,
    depth: usize,
    clip_mode: bool,
    stats: RenderStats,
}

impl<'a> DrawingContext<'a> {
    /// A context with one base layer of `width x height`, cleared to `opts.clear_rgba`.
    pub fn new(
        doc: &'a Document,
        opts: &'a Options,
        rasterizer: &'a mut dyn Rasterizer,
        width: u32,
        height: u32,
    ) -> SvgraphResult<Self> {
        let mut pool = SurfacePool::default();
        let mut base = pool.acquire_with(width, height, &opts.limits, |w, h| {
            rasterizer.allocate_surface(w, h)
        })?;
        if let Some([r, g, b, a]) = opts.clear_rgba {
            base.fill(crate::foundation::core::Rgba8Premul::from_straight_rgba(r, g, b, a).to_array());
        }
        Ok(Self {
            doc,
            opts,
            rasterizer,
            pool,
            width,
            height,
            layers: vec![Layer {
                surface: Some(base),
                clip: IRect::from_size(width, height),
                effects: LayerEffects::default(),
                isolated: false,
            }],
            states: vec![State::default()],
            acquired: Vec::new(),
            depth: 0,
            clip_mode: false,
            stats: RenderStats::default(),
        })
    }

    pub fn doc(&self) -> &'a Document {
        self.doc
    }

    pub fn options(&self) -> &'a Options {
        self.opts
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    pub fn canvas_bounds(&self) -> IRect {
        IRect::from_size(self.width, self.height)
    }

    /// Active device clip of the innermost layer.
    pub fn clip(&self) -> IRect {
        self.layers.last().map(|l| l.clip).unwrap_or_default()
    }

    pub fn layer_depth(&self) -> usize {
        self.layers.len() - 1
    }

    /// True while rendering clip-path content: shapes paint solid coverage and layers carry no
    /// effects.
    pub fn clip_mode(&self) -> bool {
        self.clip_mode
    }

    /// The effective state of whatever is currently being drawn.
    pub fn state(&self) -> &State {
        // The base state is never popped.
        &self.states[self.states.len() - 1]
    }

    /// Run `f` with `state` as the current effective state.
    pub fn with_state<T>(
        &mut self,
        state: State,
        f: impl FnOnce(&mut Self) -> SvgraphResult<T>,
    ) -> SvgraphResult<T> {
        self.states.push(state);
        let out = f(self);
        self.states.pop();
        out
    }

    /// Guard node recursion against `max_nesting_depth`.
    pub fn with_depth<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> SvgraphResult<T>,
    ) -> SvgraphResult<T> {
        if self.depth >= self.opts.limits.max_nesting_depth {
            return Err(SvgraphError::limit(format!(
                "render depth exceeds {}",
                self.opts.limits.max_nesting_depth
            )));
        }
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        out
    }

    /// Run `f` with `node` on the acquisition stack. A node that is already being drawn, or a
    /// chain longer than `max_reference_depth`, breaks the edge and draws nothing. Once
    /// `max_reference_instances` acquisitions have been made every further one fails with a
    /// limit error.
    pub fn with_acquired(
        &mut self,
        node: NodeId,
        f: impl FnOnce(&mut Self) -> SvgraphResult<()>,
    ) -> SvgraphResult<()> {
        if self.acquired.contains(&node) {
            debug!(node = node.index(), "reference cycle broken");
            self.stats.references_broken += 1;
            return Ok(());
        }
        if self.acquired.len() >= self.opts.limits.max_reference_depth {
            debug!(node = node.index(), "reference chain limit reached");
            self.stats.references_broken += 1;
            return Ok(());
        }
        let max = self.opts.limits.max_reference_instances;
        if self.stats.reference_instances >= max {
            self.stats.references_broken += 1;
            return Err(SvgraphError::limit(format!(
                "more than {max} referenced instances"
            )));
        }
        self.stats.reference_instances += 1;
        self.acquired.push(node);
        let out = f(self);
        self.acquired.pop();
        out
    }

    /// Start a discrete layer. Layers whose effects are all neutral reuse the parent target.
    pub fn push_discrete_layer(&mut self, effects: LayerEffects) -> SvgraphResult<()> {
        let effects = if self.clip_mode {
            LayerEffects {
                affine: effects.affine,
                ..LayerEffects::default()
            }
        } else {
            effects
        };
        let surface = if effects.is_passthrough() {
            None
        } else {
            Some(self.allocate_layer()?)
        };
        self.push_layer(surface, effects, false);
        Ok(())
    }

    fn push_layer(&mut self, surface: Option<Surface>, effects: LayerEffects, isolated: bool) {
        let clip = if isolated {
            self.canvas_bounds()
        } else {
            self.clip()
        };
        self.layers.push(Layer {
            surface,
            clip,
            effects,
            isolated,
        });
        self.stats.layers_pushed += 1;
        self.stats.max_layer_depth = self.stats.max_layer_depth.max(self.layer_depth());
    }

    /// Finish the innermost layer: filter, clip-path, mask, then composite with its opacity onto
    /// the parent target within the parent clip.
    pub fn pop_discrete_layer(&mut self) -> SvgraphResult<()> {
        if self.layers.len() <= 1 || self.layers.last().is_some_and(|l| l.isolated) {
            return Err(SvgraphError::render("discrete layer stack underflow"));
        }
        let Some(layer) = self.layers.pop() else {
            return Err(SvgraphError::render("discrete layer stack underflow"));
        };
        self.stats.layers_popped += 1;
        let Some(mut surface) = layer.surface else {
            return Ok(());
        };
        let fx = layer.effects;
        if let Some(id) = fx.filter.as_deref() {
            surface = self.apply_filter_effect(id, surface, &fx)?;
        }
        if let Some(id) = fx.clip_path.as_deref() {
            self.apply_clip_path(id, &mut surface, &fx)?;
        }
        if let Some(id) = fx.mask.as_deref() {
            self.apply_mask(id, &mut surface, &fx)?;
        }
        let clip = self.clip();
        let Some(dst) = self.layers.iter_mut().rev().find_map(|l| l.surface.as_mut()) else {
            return Err(SvgraphError::render("no target surface"));
        };
        self.rasterizer
            .composite(dst, &surface, clip, fx.opacity as f32)?;
        self.pool.release(surface);
        Ok(())
    }

    /// Push a layer, run `f`, and pop the layer on every exit path.
    pub fn with_discrete_layer<T>(
        &mut self,
        effects: LayerEffects,
        f: impl FnOnce(&mut Self) -> SvgraphResult<T>,
    ) -> SvgraphResult<T> {
        self.push_discrete_layer(effects)?;
        let out = f(self);
        let popped = self.pop_discrete_layer();
        match (out, popped) {
            (Ok(v), Ok(())) => Ok(v),
            (Err(e), _) | (Ok(_), Err(e)) => Err(e),
        }
    }

    /// Intersect the innermost layer clip with the device bounds of a user-space rectangle.
    /// Restored when the layer is popped.
    pub fn add_clipping_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let rect = Rect::new(x, y, x + w.max(0.0), y + h.max(0.0));
        let device = IRect::from_rect_outward(self.state().affine.transform_rect_bbox(rect));
        if let Some(top) = self.layers.last_mut() {
            top.clip = top.clip.intersect(device);
        }
    }

    /// Draw a path with the current transform into the current target.
    pub fn draw_path(&mut self, path: &BezPath, style: &PathStyle) -> SvgraphResult<()> {
        let transform = self.state().affine;
        let clip = self.clip();
        let Some(dst) = self.layers.iter_mut().rev().find_map(|l| l.surface.as_mut()) else {
            return Err(SvgraphError::render("no target surface"));
        };
        self.rasterizer.draw_path(dst, path, transform, style, clip)
    }

    /// Draw an image whose pixel grid maps to device space through `transform`.
    pub fn draw_image(&mut self, image: &Surface, transform: Affine) -> SvgraphResult<()> {
        let clip = self.clip();
        let Some(dst) = self.layers.iter_mut().rev().find_map(|l| l.surface.as_mut()) else {
            return Err(SvgraphError::render("no target surface"));
        };
        self.rasterizer.draw_image(dst, image, transform, clip)
    }

    /// Render `node` alone into a fresh canvas-sized surface, inheriting from `parent`.
    pub fn render_isolated(&mut self, node: NodeId, parent: State) -> SvgraphResult<Surface> {
        let surface = self.allocate_layer()?;
        self.push_layer(Some(surface), LayerEffects::default(), true);
        let drawn = self.with_state(parent, |ctx| super::draw::draw_node(ctx, node, false));
        let layer = match self.layers.pop() {
            Some(l) if l.isolated => l,
            _ => return Err(SvgraphError::render("isolated layer lost")),
        };
        self.stats.layers_popped += 1;
        drawn?;
        layer
            .surface
            .ok_or_else(|| SvgraphError::render("isolated layer has no surface"))
    }

    /// Hand the base surface back. Fails if any layer is still open.
    pub fn finish(mut self) -> SvgraphResult<(Surface, RenderStats)> {
        if self.layers.len() != 1 {
            return Err(SvgraphError::render(format!(
                "{} discrete layers left open",
                self.layers.len() - 1
            )));
        }
        let surface = self
            .layers
            .pop()
            .and_then(|l| l.surface)
            .ok_or_else(|| SvgraphError::render("base layer missing"))?;
        Ok((surface, self.stats))
    }

    /// Pixels held by open offscreen layers above the base layer.
    fn layer_pixels(&self) -> u64 {
        self.layers
            .iter()
            .skip(1)
            .filter_map(|l| l.surface.as_ref())
            .map(|s| u64::from(s.width()) * u64::from(s.height()))
            .sum()
    }

    /// Allocate a surface for a new layer, keeping open layers within `max_layer_pixels`.
    fn allocate_layer(&mut self) -> SvgraphResult<Surface> {
        let max = self.opts.limits.max_layer_pixels;
        let held = self
            .layer_pixels()
            .saturating_add(u64::from(self.width) * u64::from(self.height));
        if held > max {
            return Err(SvgraphError::limit(format!(
                "open layers would hold {held} pixels, limit is {max}"
            )));
        }
        self.allocate()
    }

    fn allocate(&mut self) -> SvgraphResult<Surface> {
        let rasterizer = &mut *self.rasterizer;
        self.pool
            .acquire_with(self.width, self.height, &self.opts.limits, |w, h| {
                rasterizer.allocate_surface(w, h)
            })
    }

    fn apply_filter_effect(
        &mut self,
        id: &str,
        source: Surface,
        fx: &LayerEffects,
    ) -> SvgraphResult<Surface> {
        let doc = self.doc;
        let opts = self.opts;
        let Some(filter) = doc.filter_by_id(id) else {
            debug!(id, "filter not found, drawing unfiltered");
            return Ok(source);
        };
        let background = if filter.reads_background() {
            self.layers
                .iter()
                .rev()
                .find_map(|l| l.surface.as_ref())
                .cloned()
        } else {
            None
        };
        let Some(ctx) = FilterContext::new(filter, &source, fx.affine, fx.bbox, &opts.limits)
        else {
            debug!(id, "filter region is empty, element not drawn");
            return Surface::new(self.width, self.height);
        };
        let mut ctx = ctx.with_paints(fx.fill, fx.stroke);
        if let Some(bg) = &background {
            ctx = ctx.with_background(bg);
        }
        let out = apply_filter(filter, &mut ctx, self)?;
        self.stats.filters_applied += 1;
        drop(ctx);
        self.pool.release(source);
        Ok(out)
    }

    /// Transform that maps clip or mask content into device space.
    fn content_affine(units: Units, fx: &LayerEffects) -> Option<Affine> {
        match units {
            Units::UserSpaceOnUse => Some(fx.affine),
            Units::ObjectBoundingBox => {
                let b = fx.bbox.filter(|b| b.width() > 0.0 && b.height() > 0.0)?;
                Some(fx.affine * bbox_units_transform(b))
            }
        }
    }

    fn apply_clip_path(
        &mut self,
        id: &str,
        surface: &mut Surface,
        fx: &LayerEffects,
    ) -> SvgraphResult<()> {
        let Some(def) = self.doc.registry().clip_path(id) else {
            debug!(id, "clip path not found, drawing unclipped");
            return Ok(());
        };
        let Some(affine) = Self::content_affine(def.units, fx) else {
            surface.clear();
            return Ok(());
        };
        let parent = State {
            affine,
            ..State::default()
        };
        let mut coverage = None;
        let was_clip_mode = self.clip_mode;
        self.clip_mode = true;
        let drawn = self.with_acquired(def.node, |ctx| {
            coverage = Some(ctx.render_isolated(def.node, parent)?);
            Ok(())
        });
        self.clip_mode = was_clip_mode;
        drawn?;
        match coverage {
            Some(c) => {
                mask_by_alpha(surface, &c);
                self.pool.release(c);
            }
            None => surface.clear(),
        }
        Ok(())
    }

    fn apply_mask(&mut self, id: &str, surface: &mut Surface, fx: &LayerEffects) -> SvgraphResult<()> {
        let Some(def) = self.doc.registry().mask(id) else {
            debug!(id, "mask not found, drawing unmasked");
            return Ok(());
        };
        let region = def.region.resolve(fx.bbox);
        let affine = Self::content_affine(def.content_units, fx);
        let (Some(region), Some(affine)) = (region, affine) else {
            surface.clear();
            return Ok(());
        };
        let parent = State {
            affine,
            ..State::default()
        };
        let mut content = None;
        let was_clip_mode = self.clip_mode;
        self.clip_mode = false;
        let drawn = self.with_acquired(def.node, |ctx| {
            content = Some(ctx.render_isolated(def.node, parent)?);
            Ok(())
        });
        self.clip_mode = was_clip_mode;
        drawn?;
        match content {
            Some(mut m) => {
                m.clear_outside(IRect::from_rect_outward(fx.affine.transform_rect_bbox(region)));
                luminance_to_alpha(&mut m);
                mask_by_alpha(surface, &m);
                self.pool.release(m);
            }
            None => surface.clear(),
        }
        Ok(())
    }
}

impl FilterEnv for DrawingContext<'_> {
    fn render_node(&mut self, id: &str, affine: Affine) -> SvgraphResult<Option<Surface>> {
        let Some(node) = self.doc.node_by_id(id) else {
            return Ok(None);
        };
        let parent = State {
            affine,
            ..State::default()
        };
        let mut out = None;
        self.with_acquired(node, |ctx| {
            out = Some(ctx.render_isolated(node, parent)?);
            Ok(())
        })?;
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/context.rs"]
mod tests;
