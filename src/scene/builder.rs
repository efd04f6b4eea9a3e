//! Streaming scene-graph construction.
//!
//! [`SceneBuilder`] receives one `open_tag`/`close_tag` pair per element, in document order,
//! and grows a [`Document`] arena as it goes. The open-element stack, the current-container
//! stack and the percentage viewport stack live on the builder; nothing is shared with the
//! parser that drives it.

use std::sync::Arc;

use kurbo::Shape as _;
use tracing::{debug, warn};

use crate::assets::load_href;
use crate::attr::{
    AspectRatio, parse_aspect_ratio, parse_iri, parse_length, parse_number_list, parse_transform,
    parse_view_box,
};
use crate::config::Options;
use crate::filters::FilterId;
use crate::filters::build::{
    LengthEnv, apply_child, filter_from_attributes, primitive_from_element,
    region_from_attributes, units,
};
use crate::foundation::core::{BezPath, Point, Rect, Vec2};
use crate::scene::attributes::Attributes;
use crate::scene::document::Document;
use crate::scene::node::{
    DocumentRoot, Leaf, LeafShape, Node, NodeId, NodeKind, Reference, Symbol, Units,
};
use crate::scene::registry::{ClipPathDef, MaskDef, Resource};
use crate::scene::state::State;
use crate::scene::style::{StyleEnv, apply_style, conditions_hold};

/// Curve tolerance used when circles and ellipses are flattened to Béziers.
const CURVE_TOLERANCE: f64 = 0.1;

#[derive(Debug, Clone, Copy)]
enum Axis {
    X,
    Y,
    Diagonal,
}

#[derive(Debug, Clone, Copy)]
enum OpenKind {
    /// Pushed onto the container stack; popped with the element.
    Container(NodeId),
    /// A node that takes no children of its own.
    Node,
    Filter(FilterId),
    Primitive,
    /// Unknown or child-only elements. Their children attach to the enclosing container.
    Other,
}

#[derive(Debug)]
struct OpenTag {
    name: String,
    kind: OpenKind,
    state: State,
    pushed_viewport: bool,
}

enum Attach {
    /// Appended to the current container's paint-order children.
    Child,
    /// Parent recorded, never painted as part of the tree walk.
    Detached,
}

/// Builds a [`Document`] from start and end tag callbacks.
#[derive(Debug)]
pub struct SceneBuilder {
    doc: Document,
    opts: Options,
    open: Vec<OpenTag>,
    containers: Vec<NodeId>,
    viewports: Vec<(f64, f64)>,
    /// Open elements inside a subtree that is being ignored.
    skipping: usize,
}

impl SceneBuilder {
    pub fn new(opts: &Options) -> Self {
        Self {
            doc: Document::default(),
            opts: opts.clone(),
            open: Vec::new(),
            containers: Vec::new(),
            viewports: Vec::new(),
            skipping: 0,
        }
    }

    /// The root state elements at the top level inherit from.
    fn parent_state(&self) -> State {
        self.open
            .last()
            .map(|t| t.state.clone())
            .unwrap_or_default()
    }

    fn viewport(&self) -> (f64, f64) {
        self.viewports
            .last()
            .copied()
            .unwrap_or((self.opts.default_width, self.opts.default_height))
    }

    fn style_env(&self) -> StyleEnv {
        let (w, h) = self.viewport();
        StyleEnv {
            dpi_x: self.opts.dpi_x,
            dpi_y: self.opts.dpi_y,
            viewport_width: w,
            viewport_height: h,
        }
    }

    fn length_env(&self, font_size: f64) -> LengthEnv {
        let (w, h) = self.viewport();
        LengthEnv {
            dpi_x: self.opts.dpi_x,
            dpi_y: self.opts.dpi_y,
            width: w,
            height: h,
            font_size,
        }
    }

    fn length(&self, attrs: &Attributes, name: &str, axis: Axis, font_size: f64) -> Option<f64> {
        let raw = attrs.get(name)?;
        let Some(len) = parse_length(raw) else {
            debug!(name, value = raw, "ignoring malformed length");
            return None;
        };
        let (w, h) = self.viewport();
        Some(match axis {
            Axis::X => len.normalize(self.opts.dpi_x, w, font_size),
            Axis::Y => len.normalize(self.opts.dpi_y, h, font_size),
            Axis::Diagonal => len.normalize(
                (self.opts.dpi_x + self.opts.dpi_y) / 2.0,
                ((w * w + h * h) / 2.0).sqrt(),
                font_size,
            ),
        })
    }

    fn inside_filter(&self) -> Option<FilterId> {
        self.open.iter().rev().find_map(|t| match t.kind {
            OpenKind::Filter(f) => Some(f),
            _ => None,
        })
    }

    /// Capture the state of a new element: inherited values, presentation attributes, `style`,
    /// `transform` and the conditional-processing result.
    fn capture_state(&self, attrs: &Attributes) -> State {
        let parent = self.parent_state();
        let mut state = State::child_of(&parent);
        apply_style(&mut state, &parent, attrs, &self.style_env());
        if let Some(t) = attrs.get("transform") {
            match parse_transform(t) {
                Some(a) => state.affine = a,
                None => debug!(value = t, "ignoring malformed transform"),
            }
        }
        state.cond_true = conditions_hold(attrs, &self.opts.language);
        state
    }

    fn add_node(
        &mut self,
        kind: NodeKind,
        element: &str,
        attrs: &Attributes,
        state: &State,
        attach: Attach,
    ) -> NodeId {
        let parent = self.containers.last().copied();
        let node = self.doc.push_node(Node {
            kind,
            state: state.clone(),
            element: element.to_string(),
            id: element_id(attrs),
            parent,
            children: Vec::new(),
        });
        if let (Attach::Child, Some(p)) = (attach, parent) {
            self.doc.node_mut(p).children.push(node);
        }
        node
    }

    fn register_node(&mut self, attrs: &Attributes, node: NodeId) {
        if let Some(id) = element_id(attrs) {
            self.doc.registry.insert(id, Resource::Node(node));
        }
    }

    /// Handle a start tag.
    pub fn open_tag(&mut self, name: &str, attrs: &Attributes) {
        if self.skipping > 0 {
            self.skipping += 1;
            return;
        }
        if self.open.len() >= self.opts.limits.max_nesting_depth {
            warn!(
                element = name,
                max = self.opts.limits.max_nesting_depth,
                "nesting limit reached, skipping subtree"
            );
            self.skipping = 1;
            return;
        }

        let state = self.capture_state(attrs);
        let mut pushed_viewport = false;

        let kind = if let Some(filter) = self.inside_filter() {
            match self.filter_child(filter, name, attrs, &state) {
                Some(kind) => kind,
                None => {
                    debug!(element = name, "ignoring non-primitive inside filter");
                    self.skipping = 1;
                    return;
                }
            }
        } else {
            match name {
                "svg" => {
                    let (node, viewport) = self.open_svg(attrs, &state);
                    self.viewports.push(viewport);
                    pushed_viewport = true;
                    OpenKind::Container(node)
                }
                "g" => {
                    let node = self.add_node(NodeKind::Group, name, attrs, &state, Attach::Child);
                    self.register_node(attrs, node);
                    OpenKind::Container(node)
                }
                "switch" => {
                    let node = self.add_node(
                        NodeKind::ConditionalGroup,
                        name,
                        attrs,
                        &state,
                        Attach::Child,
                    );
                    self.register_node(attrs, node);
                    OpenKind::Container(node)
                }
                "defs" => {
                    let node =
                        self.add_node(NodeKind::Group, name, attrs, &state, Attach::Detached);
                    self.register_node(attrs, node);
                    OpenKind::Container(node)
                }
                "symbol" => {
                    let view_box = attrs.get("viewBox").and_then(parse_view_box);
                    let symbol = Symbol {
                        view_box,
                        aspect: aspect(attrs),
                        overflow: state.overflow.unwrap_or(false),
                    };
                    let node = self.add_node(
                        NodeKind::Symbol(symbol),
                        name,
                        attrs,
                        &state,
                        Attach::Detached,
                    );
                    self.register_node(attrs, node);
                    if let Some(vb) = view_box {
                        self.viewports.push((vb.width, vb.height));
                        pushed_viewport = true;
                    }
                    OpenKind::Container(node)
                }
                "clipPath" => {
                    let node =
                        self.add_node(NodeKind::Group, name, attrs, &state, Attach::Detached);
                    if let Some(id) = element_id(attrs) {
                        let def = ClipPathDef {
                            node,
                            units: units(attrs, "clipPathUnits", Units::UserSpaceOnUse),
                        };
                        self.doc.registry.insert(id, Resource::ClipPath(def));
                    }
                    OpenKind::Container(node)
                }
                "mask" => {
                    let node =
                        self.add_node(NodeKind::Group, name, attrs, &state, Attach::Detached);
                    if let Some(id) = element_id(attrs) {
                        let env = self.length_env(state.font_size.value);
                        let def = MaskDef {
                            node,
                            region: region_from_attributes(
                                attrs,
                                &env,
                                "maskUnits",
                                Units::ObjectBoundingBox,
                            ),
                            content_units: units(
                                attrs,
                                "maskContentUnits",
                                Units::UserSpaceOnUse,
                            ),
                        };
                        self.doc.registry.insert(id, Resource::Mask(def));
                    }
                    OpenKind::Container(node)
                }
                "use" => self.open_use(attrs, &state),
                "filter" => {
                    let env = self.length_env(state.font_size.value);
                    let filter = self.doc.push_filter(filter_from_attributes(attrs, &env));
                    if let Some(id) = element_id(attrs) {
                        self.doc.registry.insert(id, Resource::Filter(filter));
                    }
                    OpenKind::Filter(filter)
                }
                "image" => {
                    self.open_image(attrs, &state);
                    OpenKind::Node
                }
                _ => match self.shape_path(name, attrs, state.font_size.value) {
                    Some(path) => {
                        let leaf = Leaf {
                            shape: LeafShape::Path(path),
                        };
                        let node =
                            self.add_node(NodeKind::Leaf(leaf), name, attrs, &state, Attach::Child);
                        self.register_node(attrs, node);
                        OpenKind::Node
                    }
                    None => OpenKind::Other,
                },
            }
        };

        if let OpenKind::Container(node) = kind {
            self.containers.push(node);
        }
        self.open.push(OpenTag {
            name: name.to_string(),
            kind,
            state,
            pushed_viewport,
        });
    }

    /// Handle an end tag. A name that does not match the innermost open element is ignored.
    pub fn close_tag(&mut self, name: &str) {
        if self.skipping > 0 {
            self.skipping -= 1;
            return;
        }
        match self.open.last() {
            Some(top) if top.name == name => {}
            Some(top) => {
                debug!(expected = %top.name, got = name, "ignoring mismatched close tag");
                return;
            }
            None => {
                debug!(got = name, "ignoring close tag with nothing open");
                return;
            }
        }
        let Some(top) = self.open.pop() else {
            return;
        };
        if let OpenKind::Container(_) = top.kind {
            self.containers.pop();
        }
        if top.pushed_viewport {
            self.viewports.pop();
        }
    }

    /// Seal the document: run the reference resolution pass and hand the arena over.
    pub fn finish(mut self) -> Document {
        if !self.open.is_empty() {
            debug!(open = self.open.len(), "document ended with unclosed elements");
        }
        self.doc.resolve_references();
        self.doc
    }

    fn open_svg(&mut self, attrs: &Attributes, state: &State) -> (NodeId, (f64, f64)) {
        let outermost = self.doc.root.is_none();
        let view_box = attrs.get("viewBox").and_then(parse_view_box);
        let fs = state.font_size.value;

        // Percentages of the outermost root refer to its own viewBox when there is one.
        if outermost && let Some(vb) = view_box {
            self.viewports.push((vb.width, vb.height));
        }
        let (vw, vh) = self.viewport();
        let width = self.length(attrs, "width", Axis::X, fs);
        let height = self.length(attrs, "height", Axis::Y, fs);
        let x = self.length(attrs, "x", Axis::X, fs).unwrap_or(0.0);
        let y = self.length(attrs, "y", Axis::Y, fs).unwrap_or(0.0);
        if outermost && view_box.is_some() {
            self.viewports.pop();
        }

        let (width, height) = if outermost {
            (
                width.or(view_box.map(|v| v.width)).unwrap_or(self.opts.default_width),
                height.or(view_box.map(|v| v.height)).unwrap_or(self.opts.default_height),
            )
        } else {
            (width.unwrap_or(vw), height.unwrap_or(vh))
        };

        let root = DocumentRoot {
            x,
            y,
            width,
            height,
            view_box,
            aspect: aspect(attrs),
            overflow: outermost || state.overflow.unwrap_or(false),
        };
        let node = self.add_node(NodeKind::DocumentRoot(root), "svg", attrs, state, Attach::Child);
        self.register_node(attrs, node);
        if outermost {
            self.doc.root = Some(node);
        }
        let viewport = match view_box {
            Some(vb) => (vb.width, vb.height),
            None => (width, height),
        };
        (node, viewport)
    }

    fn open_use(&mut self, attrs: &Attributes, state: &State) -> OpenKind {
        let Some(href) = attrs.href() else {
            debug!("use element without href");
            return OpenKind::Other;
        };
        let fs = state.font_size.value;
        let width = self.length(attrs, "width", Axis::X, fs);
        let height = self.length(attrs, "height", Axis::Y, fs);
        // Only an element with both sizes given can be rejected.
        let rejected = matches!((width, height), (Some(w), Some(h)) if w <= 0.0 || h <= 0.0);
        let target = parse_iri(href);
        let link = match (&target, rejected) {
            (Some(t), false) => self.doc.registry.node(t),
            _ => None,
        };
        if target.is_none() {
            debug!(href, "use href is not a fragment reference");
        }
        let reference = Reference {
            x: self.length(attrs, "x", Axis::X, fs).unwrap_or(0.0),
            y: self.length(attrs, "y", Axis::Y, fs).unwrap_or(0.0),
            width,
            height,
            href: target,
            link,
            rejected,
        };
        let pending = !rejected && link.is_none() && reference.href.is_some();
        let node = self.add_node(
            NodeKind::Reference(reference),
            "use",
            attrs,
            state,
            Attach::Child,
        );
        self.register_node(attrs, node);
        if rejected {
            debug!(node = node.index(), "use with non-positive size is never drawn");
        }
        if pending {
            self.doc.pending.push(node);
        }
        OpenKind::Node
    }

    fn open_image(&mut self, attrs: &Attributes, state: &State) {
        let fs = state.font_size.value;
        let x = self.length(attrs, "x", Axis::X, fs).unwrap_or(0.0);
        let y = self.length(attrs, "y", Axis::Y, fs).unwrap_or(0.0);
        let w = self.length(attrs, "width", Axis::X, fs).unwrap_or(0.0);
        let h = self.length(attrs, "height", Axis::Y, fs).unwrap_or(0.0);
        let surface = match attrs.href() {
            Some(href) => match load_href(href, &self.opts) {
                Ok(s) => Some(Arc::new(s)),
                Err(e) => {
                    warn!(error = %e, "image could not be loaded");
                    None
                }
            },
            None => None,
        };
        let leaf = Leaf {
            shape: LeafShape::Image {
                surface,
                rect: Rect::new(x, y, x + w.max(0.0), y + h.max(0.0)),
                aspect: aspect(attrs),
            },
        };
        let node = self.add_node(NodeKind::Leaf(leaf), "image", attrs, state, Attach::Child);
        self.register_node(attrs, node);
    }

    /// Elements inside a `filter`: primitives, and the children that refine the latest one.
    fn filter_child(
        &mut self,
        filter: FilterId,
        name: &str,
        attrs: &Attributes,
        state: &State,
    ) -> Option<OpenKind> {
        let parent_is_filter = matches!(self.open.last().map(|t| t.kind), Some(OpenKind::Filter(_)));
        let parent_is_primitive =
            matches!(self.open.last().map(|t| t.kind), Some(OpenKind::Primitive));
        let env = self.length_env(state.font_size.value);
        let f = &mut self.doc.filters[filter.index()];
        if parent_is_filter {
            let prim = primitive_from_element(name, attrs, state, f.primitive_units, &env, &self.opts)?;
            f.primitives.push(prim);
            return Some(OpenKind::Primitive);
        }
        if parent_is_primitive {
            let prim = f.primitives.last_mut()?;
            return apply_child(prim, name, attrs).then_some(OpenKind::Other);
        }
        None
    }

    fn shape_path(&self, name: &str, attrs: &Attributes, fs: f64) -> Option<BezPath> {
        let len = |n: &str, axis: Axis| self.length(attrs, n, axis, fs);
        let path = match name {
            "rect" => {
                let x = len("x", Axis::X).unwrap_or(0.0);
                let y = len("y", Axis::Y).unwrap_or(0.0);
                let w = len("width", Axis::X).unwrap_or(0.0);
                let h = len("height", Axis::Y).unwrap_or(0.0);
                if w <= 0.0 || h <= 0.0 {
                    return Some(BezPath::new());
                }
                let rx = len("rx", Axis::X).filter(|v| *v >= 0.0);
                let ry = len("ry", Axis::Y).filter(|v| *v >= 0.0);
                let (rx, ry) = match (rx, ry) {
                    (Some(rx), Some(ry)) => (rx, ry),
                    (Some(r), None) | (None, Some(r)) => (r, r),
                    (None, None) => (0.0, 0.0),
                };
                rounded_rect_path(
                    Rect::new(x, y, x + w, y + h),
                    rx.min(w / 2.0),
                    ry.min(h / 2.0),
                )
            }
            "circle" => {
                let r = len("r", Axis::Diagonal).unwrap_or(0.0);
                if r <= 0.0 {
                    return Some(BezPath::new());
                }
                let c = Point::new(len("cx", Axis::X).unwrap_or(0.0), len("cy", Axis::Y).unwrap_or(0.0));
                kurbo::Circle::new(c, r).to_path(CURVE_TOLERANCE)
            }
            "ellipse" => {
                let rx = len("rx", Axis::X).unwrap_or(0.0);
                let ry = len("ry", Axis::Y).unwrap_or(0.0);
                if rx <= 0.0 || ry <= 0.0 {
                    return Some(BezPath::new());
                }
                let c = Point::new(len("cx", Axis::X).unwrap_or(0.0), len("cy", Axis::Y).unwrap_or(0.0));
                kurbo::Ellipse::new(c, Vec2::new(rx, ry), 0.0).to_path(CURVE_TOLERANCE)
            }
            "line" => {
                let mut p = BezPath::new();
                p.move_to((len("x1", Axis::X).unwrap_or(0.0), len("y1", Axis::Y).unwrap_or(0.0)));
                p.line_to((len("x2", Axis::X).unwrap_or(0.0), len("y2", Axis::Y).unwrap_or(0.0)));
                p
            }
            "polyline" | "polygon" => {
                let coords = attrs.get("points").map(parse_number_list).unwrap_or_default();
                let mut p = BezPath::new();
                for (i, xy) in coords.chunks_exact(2).enumerate() {
                    if i == 0 {
                        p.move_to((xy[0], xy[1]));
                    } else {
                        p.line_to((xy[0], xy[1]));
                    }
                }
                if name == "polygon" && !p.elements().is_empty() {
                    p.close_path();
                }
                p
            }
            "path" => match attrs.get("d") {
                Some(d) => BezPath::from_svg(d).unwrap_or_else(|e| {
                    debug!(error = %e, "ignoring malformed path data");
                    BezPath::new()
                }),
                None => BezPath::new(),
            },
            _ => return None,
        };
        Some(path)
    }
}

fn element_id(attrs: &Attributes) -> Option<String> {
    attrs
        .get("id")
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

fn aspect(attrs: &Attributes) -> AspectRatio {
    attrs
        .get("preserveAspectRatio")
        .and_then(parse_aspect_ratio)
        .unwrap_or_default()
}

/// Rectangle with elliptical corners of radii `rx`/`ry` (already clamped to half the size).
fn rounded_rect_path(r: Rect, rx: f64, ry: f64) -> BezPath {
    let mut p = BezPath::new();
    if rx <= 0.0 || ry <= 0.0 {
        p.move_to((r.x0, r.y0));
        p.line_to((r.x1, r.y0));
        p.line_to((r.x1, r.y1));
        p.line_to((r.x0, r.y1));
        p.close_path();
        return p;
    }
    // Cubic approximation of a quarter ellipse.
    const K: f64 = 0.552_284_749_830_793_4;
    let (kx, ky) = (rx * K, ry * K);
    p.move_to((r.x0 + rx, r.y0));
    p.line_to((r.x1 - rx, r.y0));
    p.curve_to((r.x1 - rx + kx, r.y0), (r.x1, r.y0 + ry - ky), (r.x1, r.y0 + ry));
    p.line_to((r.x1, r.y1 - ry));
    p.curve_to((r.x1, r.y1 - ry + ky), (r.x1 - rx + kx, r.y1), (r.x1 - rx, r.y1));
    p.line_to((r.x0 + rx, r.y1));
    p.curve_to((r.x0 + rx - kx, r.y1), (r.x0, r.y1 - ry + ky), (r.x0, r.y1 - ry));
    p.line_to((r.x0, r.y0 + ry));
    p.curve_to((r.x0, r.y0 + ry - ky), (r.x0 + rx - kx, r.y0), (r.x0 + rx, r.y0));
    p.close_path();
    p
}

#[cfg(test)]
#[path = "../../tests/unit/scene/builder.rs"]
mod tests;
