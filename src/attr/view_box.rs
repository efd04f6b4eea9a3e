use crate::foundation::core::{Affine, Rect, Vec2};

use super::number::parse_number_list;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewBox {
    pub fn to_rect(self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

/// `min-x min-y width height`; a non-positive size disables the viewBox.
pub fn parse_view_box(s: &str) -> Option<ViewBox> {
    match parse_number_list(s).as_slice() {
        [x, y, w, h] if *w > 0.0 && *h > 0.0 => Some(ViewBox {
            x: *x,
            y: *y,
            width: *w,
            height: *h,
        }),
        _ => None,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align1D {
    Min,
    Mid,
    Max,
}

impl Align1D {
    fn offset(self, extra: f64) -> f64 {
        match self {
            Self::Min => 0.0,
            Self::Mid => extra / 2.0,
            Self::Max => extra,
        }
    }
}

/// A parsed `preserveAspectRatio`. `align == None` stretches non-uniformly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AspectRatio {
    pub align: Option<(Align1D, Align1D)>,
    pub slice: bool,
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self {
            align: Some((Align1D::Mid, Align1D::Mid)),
            slice: false,
        }
    }
}

impl AspectRatio {
    /// Fit content of size `content_w x content_h` into the viewport `(x, y, w, h)` and return the
    /// placed rectangle `(x, y, w, h)` the content maps onto.
    pub fn fit(
        self,
        content_w: f64,
        content_h: f64,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
    ) -> (f64, f64, f64, f64) {
        let Some((ax, ay)) = self.align else {
            return (x, y, w, h);
        };
        if content_w <= 0.0 || content_h <= 0.0 {
            return (x, y, w, h);
        }
        let (mut new_w, mut new_h) = (w, h);
        if (content_h * w > content_w * h) == !self.slice {
            new_w = content_w * h / content_h;
        } else {
            new_h = content_h * w / content_w;
        }
        (
            x - ax.offset(new_w - w),
            y - ay.offset(new_h - h),
            new_w,
            new_h,
        )
    }
}

pub fn parse_aspect_ratio(s: &str) -> Option<AspectRatio> {
    let mut words = s.split_ascii_whitespace();
    let mut first = words.next()?;
    if first == "defer" {
        first = words.next()?;
    }
    let align = match first {
        "none" => None,
        other => {
            let (x, y) = other.split_at_checked(4)?;
            let ax = match x {
                "xMin" => Align1D::Min,
                "xMid" => Align1D::Mid,
                "xMax" => Align1D::Max,
                _ => return None,
            };
            let ay = match y {
                "YMin" => Align1D::Min,
                "YMid" => Align1D::Mid,
                "YMax" => Align1D::Max,
                _ => return None,
            };
            Some((ax, ay))
        }
    };
    let slice = match words.next() {
        None | Some("meet") => false,
        Some("slice") => true,
        Some(_) => return None,
    };
    Some(AspectRatio { align, slice })
}

/// Map `vb` onto the viewport `(x, y, w, h)` under `aspect`.
pub fn view_box_transform(vb: ViewBox, aspect: AspectRatio, x: f64, y: f64, w: f64, h: f64) -> Affine {
    let (px, py, pw, ph) = aspect.fit(vb.width, vb.height, x, y, w, h);
    Affine::translate(Vec2::new(px, py))
        * Affine::scale_non_uniform(pw / vb.width, ph / vb.height)
        * Affine::translate(Vec2::new(-vb.x, -vb.y))
}

/// `visible`/`auto` keep content unclipped; `hidden`/`scroll` clip.
pub fn parse_overflow(s: &str) -> Option<bool> {
    match s.trim() {
        "visible" | "auto" => Some(true),
        "hidden" | "scroll" => Some(false),
        _ => None,
    }
}

/// `url(#id)`, `url('#id')` or a bare `#id` fragment reference.
pub fn parse_iri(s: &str) -> Option<String> {
    let s = s.trim();
    let inner = match s.strip_prefix("url(") {
        Some(rest) => rest.split_once(')')?.0.trim(),
        None => s,
    };
    let inner = inner.trim_matches(|c| c == '\'' || c == '"');
    let id = inner.strip_prefix('#')?;
    (!id.is_empty()).then(|| id.to_string())
}

#[cfg(test)]
#[path = "../../tests/unit/attr/view_box.rs"]
mod tests;
