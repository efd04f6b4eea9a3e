//! Render dispatcher: one `match` over [`NodeKind`] drives the whole tree walk.

use tracing::{debug, warn};

use crate::attr::Color;
use crate::config::Options;
use crate::foundation::core::{Affine, Vec2};
use crate::foundation::error::{SvgraphError, SvgraphResult};
use crate::render::context::{DrawingContext, LayerEffects, RenderStats};
use crate::render::raster::{PathStyle, Rasterizer, StrokeStyle};
use crate::render::surface::Surface;
use crate::scene::document::Document;
use crate::scene::node::{LeafShape, Node, NodeId, NodeKind};
use crate::scene::state::State;

/// Render the whole document, or only the element registered as `id`.
pub fn render(
    doc: &Document,
    id: Option<&str>,
    rasterizer: &mut dyn Rasterizer,
    opts: &Options,
) -> SvgraphResult<Surface> {
    render_with_stats(doc, id, rasterizer, opts).map(|(surface, _)| surface)
}

/// [`render`], also returning the layer and reference counters of the pass.
#[tracing::instrument(skip(doc, rasterizer, opts))]
pub fn render_with_stats(
    doc: &Document,
    id: Option<&str>,
    rasterizer: &mut dyn Rasterizer,
    opts: &Options,
) -> SvgraphResult<(Surface, RenderStats)> {
    let (w, h) = doc
        .intrinsic_size()
        .unwrap_or((opts.default_width, opts.default_height));
    let width = canvas_dim(w);
    let height = canvas_dim(h);

    let target = match id {
        Some(name) => Some(
            doc.node_by_id(name)
                .ok_or_else(|| SvgraphError::not_found(format!("no element with id `{name}`")))?,
        ),
        None => doc.root(),
    };

    let mut ctx = DrawingContext::new(doc, opts, rasterizer, width, height)?;
    match target {
        Some(node) => {
            let parent = ancestor_state(doc, node);
            ctx.with_state(parent, |ctx| draw_node(ctx, node, false))?;
        }
        None => debug!("document has no root element, nothing to draw"),
    }
    let (surface, stats) = ctx.finish()?;
    debug!(
        width,
        height,
        layers = stats.layers_pushed,
        broken = stats.references_broken,
        "render finished"
    );
    Ok((surface, stats))
}

fn canvas_dim(v: f64) -> u32 {
    if v.is_finite() && v > 1.0 {
        v.ceil().min(f64::from(u32::MAX)) as u32
    } else {
        1
    }
}

/// Effective state of `node`'s parent, rebuilt by walking down from the outermost ancestor.
fn ancestor_state(doc: &Document, node: NodeId) -> State {
    let mut chain = Vec::new();
    let mut cur = doc.node(node).parent;
    while let Some(id) = cur {
        if chain.contains(&id) {
            break;
        }
        chain.push(id);
        cur = doc.node(id).parent;
    }
    let mut state = State::default();
    for id in chain.into_iter().rev() {
        let n = doc.node(id);
        state = n.state.reinherit(&state, false);
        if let NodeKind::DocumentRoot(root) = &n.kind {
            state.affine = state.affine * root.content_transform();
        }
    }
    state
}

/// Draw one node inside the current effective state. Recoverable failures skip the subtree.
pub(crate) fn draw_node(
    ctx: &mut DrawingContext<'_>,
    id: NodeId,
    dominate: bool,
) -> SvgraphResult<()> {
    match draw_node_inner(ctx, id, dominate) {
        Err(e) if e.is_recoverable() => {
            warn!(node = id.index(), error = %e, "subtree skipped");
            Ok(())
        }
        other => other,
    }
}

fn draw_node_inner(ctx: &mut DrawingContext<'_>, id: NodeId, dominate: bool) -> SvgraphResult<()> {
    let doc = ctx.doc();
    let Some(node) = doc.get(id) else {
        return Err(SvgraphError::render(format!("dangling node {}", id.index())));
    };
    let state = node.state.reinherit(ctx.state(), dominate);
    if !state.display {
        return Ok(());
    }
    if let NodeKind::Reference(r) = &node.kind
        && (r.rejected || r.link.is_none())
    {
        return Ok(());
    }

    ctx.with_depth(|ctx| {
        let bbox = if ctx.clip_mode() {
            None
        } else if state.filter.is_some() || state.clip_path.is_some() || state.mask.is_some() {
            doc.bounding_box(id)
        } else {
            None
        };
        let effects = LayerEffects::from_state(&state, bbox);
        let filtered = state.filter.is_some() && !ctx.clip_mode();
        let body = move |ctx: &mut DrawingContext<'_>| {
            ctx.with_state(state, |ctx| {
                ctx.with_discrete_layer(effects, |ctx| draw_contents(ctx, node))
            })
        };
        if filtered {
            // A filter may pull this node back in through feImage.
            ctx.with_acquired(id, body)
        } else {
            body(ctx)
        }
    })
}

fn draw_contents(ctx: &mut DrawingContext<'_>, node: &Node) -> SvgraphResult<()> {
    match &node.kind {
        NodeKind::Group => draw_children(ctx, &node.children),
        NodeKind::ConditionalGroup => {
            let doc = ctx.doc();
            match node.children.iter().copied().find(|c| doc.node(*c).state.cond_true) {
                Some(child) => draw_node(ctx, child, false),
                None => Ok(()),
            }
        }
        NodeKind::Symbol(sym) => {
            if !sym.overflow
                && let Some(vb) = sym.view_box
            {
                ctx.add_clipping_rect(vb.x, vb.y, vb.width, vb.height);
            }
            draw_children(ctx, &node.children)
        }
        NodeKind::DocumentRoot(root) => {
            if !root.overflow {
                ctx.add_clipping_rect(root.x, root.y, root.width, root.height);
            }
            let mut inner = ctx.state().clone();
            inner.affine = inner.affine * root.content_transform();
            ctx.with_state(inner, |ctx| draw_children(ctx, &node.children))
        }
        NodeKind::Reference(r) => {
            let Some(target) = r.link else {
                return Ok(());
            };
            let doc = ctx.doc();
            let mut inner = ctx.state().clone();
            inner.affine = inner.affine * r.content_transform(doc.node(target));
            ctx.with_acquired(target, |ctx| {
                ctx.with_state(inner, |ctx| draw_node(ctx, target, true))
            })
        }
        NodeKind::Leaf(leaf) => {
            if !ctx.state().is_visible() {
                return Ok(());
            }
            match &leaf.shape {
                LeafShape::Path(path) => {
                    if path.elements().is_empty() {
                        return Ok(());
                    }
                    let style = if ctx.clip_mode() {
                        PathStyle {
                            fill: Some((Color::BLACK, ctx.state().clip_rule.value)),
                            stroke: None,
                        }
                    } else {
                        path_style(ctx.state())
                    };
                    ctx.draw_path(path, &style)
                }
                LeafShape::Image {
                    surface,
                    rect,
                    aspect,
                } => {
                    let Some(image) = surface else {
                        return Ok(());
                    };
                    if ctx.clip_mode() || image.width() == 0 || image.height() == 0 {
                        return Ok(());
                    }
                    if rect.width() <= 0.0 || rect.height() <= 0.0 {
                        return Ok(());
                    }
                    let (iw, ih) = (f64::from(image.width()), f64::from(image.height()));
                    let (px, py, pw, ph) =
                        aspect.fit(iw, ih, rect.x0, rect.y0, rect.width(), rect.height());
                    if aspect.slice {
                        ctx.add_clipping_rect(rect.x0, rect.y0, rect.width(), rect.height());
                    }
                    let placement = ctx.state().affine
                        * Affine::translate(Vec2::new(px, py))
                        * Affine::scale_non_uniform(pw / iw, ph / ih);
                    ctx.draw_image(image, placement)
                }
            }
        }
    }
}

fn draw_children(ctx: &mut DrawingContext<'_>, children: &[NodeId]) -> SvgraphResult<()> {
    for &child in children {
        draw_node(ctx, child, false)?;
    }
    Ok(())
}

fn path_style(state: &State) -> PathStyle {
    let fill = state.fill_color().map(|c| (c, state.fill_rule.value));
    let width = state.stroke_width.value;
    let stroke = state
        .stroke_color()
        .filter(|_| width > 0.0)
        .map(|color| StrokeStyle {
            color,
            width,
            cap: state.stroke_linecap.value,
            join: state.stroke_linejoin.value,
            miter_limit: state.stroke_miterlimit.value,
        });
    PathStyle { fill, stroke }
}
