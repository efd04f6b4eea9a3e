use std::sync::Arc;

use crate::attr::{AspectRatio, ViewBox, view_box_transform};
use crate::foundation::core::{Affine, BezPath, Rect, Vec2};
use crate::render::surface::Surface;
use crate::scene::state::State;

/// Index of a node in its [`Document`](crate::scene::Document) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Coordinate system a region or clip is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Units {
    #[default]
    UserSpaceOnUse,
    ObjectBoundingBox,
}

impl Units {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "userSpaceOnUse" => Some(Self::UserSpaceOnUse),
            "objectBoundingBox" => Some(Self::ObjectBoundingBox),
            _ => None,
        }
    }
}

/// A rectangle resolved at build time: bounding-box fractions or user units depending on
/// `units`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub units: Units,
}

impl Region {
    /// The user-space rectangle. `None` when bounding-box units meet a missing or empty bbox.
    pub fn resolve(&self, bbox: Option<Rect>) -> Option<Rect> {
        match self.units {
            Units::UserSpaceOnUse => Some(Rect::new(
                self.x,
                self.y,
                self.x + self.width,
                self.y + self.height,
            )),
            Units::ObjectBoundingBox => {
                let b = bbox?;
                if b.width() <= 0.0 || b.height() <= 0.0 {
                    return None;
                }
                let x = b.x0 + self.x * b.width();
                let y = b.y0 + self.y * b.height();
                Some(Rect::new(
                    x,
                    y,
                    x + self.width * b.width(),
                    y + self.height * b.height(),
                ))
            }
        }
    }
}

/// Map from bounding-box units to user space.
pub fn bbox_units_transform(bbox: Rect) -> Affine {
    Affine::translate(Vec2::new(bbox.x0, bbox.y0)) * Affine::scale_non_uniform(bbox.width(), bbox.height())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub x: f64,
    pub y: f64,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub href: Option<String>,
    pub link: Option<NodeId>,
    /// Explicit non-positive size; never resolved and never drawn.
    pub rejected: bool,
}

impl Reference {
    /// Transform from the target's coordinate system into the reference's user space.
    pub fn content_transform(&self, target: &Node) -> Affine {
        if let NodeKind::Symbol(sym) = &target.kind
            && let Some(vb) = sym.view_box
        {
            let w = self.width.unwrap_or(vb.width);
            let h = self.height.unwrap_or(vb.height);
            return view_box_transform(vb, sym.aspect, self.x, self.y, w, h);
        }
        Affine::translate(Vec2::new(self.x, self.y))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub view_box: Option<ViewBox>,
    pub aspect: AspectRatio,
    pub overflow: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRoot {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub view_box: Option<ViewBox>,
    pub aspect: AspectRatio,
    pub overflow: bool,
}

impl DocumentRoot {
    /// Viewport mapping applied to the children.
    pub fn content_transform(&self) -> Affine {
        match self.view_box {
            Some(vb) => view_box_transform(vb, self.aspect, self.x, self.y, self.width, self.height),
            None => Affine::translate(Vec2::new(self.x, self.y)),
        }
    }

    pub fn viewport(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

#[derive(Debug, Clone)]
pub enum LeafShape {
    Path(BezPath),
    Image {
        /// `None` when the reference could not be loaded.
        surface: Option<Arc<Surface>>,
        rect: Rect,
        aspect: AspectRatio,
    },
}

#[derive(Debug, Clone)]
pub struct Leaf {
    pub shape: LeafShape,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Group,
    Reference(Reference),
    Symbol(Symbol),
    DocumentRoot(DocumentRoot),
    ConditionalGroup,
    Leaf(Leaf),
}

impl NodeKind {
    pub fn is_container(&self) -> bool {
        !matches!(self, Self::Reference(_) | Self::Leaf(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Reference(_) => "reference",
            Self::Symbol(_) => "symbol",
            Self::DocumentRoot(_) => "document-root",
            Self::ConditionalGroup => "conditional-group",
            Self::Leaf(_) => "leaf",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub state: State,
    /// Element name the node was built from.
    pub element: String,
    pub id: Option<String>,
    /// Structural parent; not an ownership edge.
    pub parent: Option<NodeId>,
    /// Paint-order children.
    pub children: Vec<NodeId>,
}
