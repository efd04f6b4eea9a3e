//! Cascading graphics state.
//!
//! Each node stores the [`State`] captured at build time. At render time the dispatcher derives an
//! effective state with [`State::reinherit`] against the state of whatever context the node is
//! being drawn in, which is how a referenced subtree picks up the referencing element's
//! properties.

use crate::attr::{Color, Paint};
use crate::foundation::core::Affine;
use crate::transform::compose;

/// One inheritable property: its value plus whether this node set it explicitly.
#[derive(Clone, Debug, PartialEq)]
pub struct Prop<T> {
    pub value: T,
    pub specified: bool,
}

impl<T: Clone> Prop<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            specified: false,
        }
    }

    pub fn set(&mut self, value: T) {
        self.value = value;
        self.specified = true;
    }

    fn inherited(&self) -> Self {
        Self::new(self.value.clone())
    }

    fn reinherit(&mut self, parent: &Self, dominate: bool) {
        let take = if dominate {
            !self.specified || parent.specified
        } else {
            !self.specified
        };
        if take {
            self.value = parent.value.clone();
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillRule {
    NonZero,
    EvenOdd,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineJoin {
    Miter,
    Round,
    Bevel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
    Collapse,
}

#[derive(Clone, Debug, PartialEq)]
pub struct State {
    /// Local transform at build time; the accumulated user-to-device transform once reinherited.
    pub affine: Affine,

    pub fill: Prop<Paint>,
    pub fill_opacity: Prop<f64>,
    pub fill_rule: Prop<FillRule>,
    pub clip_rule: Prop<FillRule>,
    pub stroke: Prop<Paint>,
    pub stroke_opacity: Prop<f64>,
    pub stroke_width: Prop<f64>,
    pub stroke_linecap: Prop<LineCap>,
    pub stroke_linejoin: Prop<LineJoin>,
    pub stroke_miterlimit: Prop<f64>,
    pub color: Prop<Color>,
    pub font_size: Prop<f64>,
    pub font_family: Prop<String>,
    pub visibility: Prop<Visibility>,

    // Not inherited.
    pub opacity: f64,
    pub clip_path: Option<String>,
    pub mask: Option<String>,
    pub filter: Option<String>,
    pub overflow: Option<bool>,
    pub display: bool,
    pub flood_color: Color,
    pub flood_opacity: f64,
    pub lighting_color: Color,
    pub cond_true: bool,
}

impl Default for State {
    fn default() -> Self {
        Self {
            affine: Affine::IDENTITY,
            fill: Prop::new(Paint::Color(Color::BLACK)),
            fill_opacity: Prop::new(1.0),
            fill_rule: Prop::new(FillRule::NonZero),
            clip_rule: Prop::new(FillRule::NonZero),
            stroke: Prop::new(Paint::None),
            stroke_opacity: Prop::new(1.0),
            stroke_width: Prop::new(1.0),
            stroke_linecap: Prop::new(LineCap::Butt),
            stroke_linejoin: Prop::new(LineJoin::Miter),
            stroke_miterlimit: Prop::new(4.0),
            color: Prop::new(Color::BLACK),
            font_size: Prop::new(12.0),
            font_family: Prop::new("Times New Roman".to_string()),
            visibility: Prop::new(Visibility::Visible),
            opacity: 1.0,
            clip_path: None,
            mask: None,
            filter: None,
            overflow: None,
            display: true,
            flood_color: Color::BLACK,
            flood_opacity: 1.0,
            lighting_color: Color::WHITE,
            cond_true: true,
        }
    }
}

macro_rules! for_each_inherited {
    ($m:ident) => {
        $m!(fill);
        $m!(fill_opacity);
        $m!(fill_rule);
        $m!(clip_rule);
        $m!(stroke);
        $m!(stroke_opacity);
        $m!(stroke_width);
        $m!(stroke_linecap);
        $m!(stroke_linejoin);
        $m!(stroke_miterlimit);
        $m!(color);
        $m!(font_size);
        $m!(font_family);
        $m!(visibility);
    };
}

impl State {
    /// Build-time capture for a new element: inheritable values flow down unflagged, everything
    /// else starts from its initial value.
    pub fn child_of(parent: &State) -> Self {
        let mut out = Self::default();
        macro_rules! copy {
            ($f:ident) => {
                out.$f = parent.$f.inherited();
            };
        }
        for_each_inherited!(copy);
        out
    }

    /// Effective state for drawing this node inside `parent`.
    ///
    /// Without `dominate` the node's explicitly set properties win. With `dominate` anything the
    /// parent set explicitly overrides the node. The transform always composes as
    /// `parent.affine * self.affine`. `self` is never mutated.
    pub fn reinherit(&self, parent: &State, dominate: bool) -> State {
        let mut out = self.clone();
        macro_rules! take {
            ($f:ident) => {
                out.$f.reinherit(&parent.$f, dominate);
            };
        }
        for_each_inherited!(take);
        out.affine = compose(self.affine, parent.affine);
        out
    }

    /// Whether drawing this node needs its own offscreen layer.
    pub fn needs_layer(&self) -> bool {
        self.opacity < 1.0 || self.filter.is_some() || self.clip_path.is_some() || self.mask.is_some()
    }

    pub fn is_visible(&self) -> bool {
        self.visibility.value == Visibility::Visible
    }

    /// Resolve a paint to a drawable color, applying `currentColor` and the given opacity.
    /// Paint servers resolve to their fallback.
    pub fn resolve_paint(&self, paint: &Paint, opacity: f64) -> Option<Color> {
        match paint {
            Paint::None => None,
            Paint::Color(c) => Some(c.with_alpha_factor(opacity)),
            Paint::CurrentColor => Some(self.color.value.with_alpha_factor(opacity)),
            Paint::Server { fallback, .. } => fallback
                .as_deref()
                .and_then(|f| self.resolve_paint(f, opacity)),
        }
    }

    pub fn fill_color(&self) -> Option<Color> {
        self.resolve_paint(&self.fill.value, self.fill_opacity.value)
    }

    pub fn stroke_color(&self) -> Option<Color> {
        self.resolve_paint(&self.stroke.value, self.stroke_opacity.value)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/state.rs"]
mod tests;
