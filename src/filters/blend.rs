use crate::foundation::core::IRect;
use crate::foundation::error::SvgraphResult;
use crate::render::surface::Surface;

use super::pixel::{from_unit, map2, to_unit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Darken,
    Lighten,
}

impl BlendMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "normal" => Some(Self::Normal),
            "multiply" => Some(Self::Multiply),
            "screen" => Some(Self::Screen),
            "darken" => Some(Self::Darken),
            "lighten" => Some(Self::Lighten),
            _ => None,
        }
    }
}

/// Blend `top` (`in`) onto `bottom` (`in2`) on premultiplied values.
pub fn apply(top: &Surface, bottom: &Surface, mode: BlendMode, bounds: IRect) -> SvgraphResult<Surface> {
    map2(top, bottom, bounds, |a, b| blend_pixel(a, b, mode))
}

pub(crate) fn blend_pixel(a: [u8; 4], b: [u8; 4], mode: BlendMode) -> [u8; 4] {
    let a = to_unit(a);
    let b = to_unit(b);
    let (qa, qb) = (a[3], b[3]);
    let mut out = [0.0; 4];
    for i in 0..3 {
        let (ca, cb) = (a[i], b[i]);
        out[i] = match mode {
            BlendMode::Normal => (1.0 - qa) * cb + ca,
            BlendMode::Multiply => (1.0 - qa) * cb + (1.0 - qb) * ca + ca * cb,
            BlendMode::Screen => cb + ca - ca * cb,
            BlendMode::Darken => ((1.0 - qa) * cb + ca).min((1.0 - qb) * ca + cb),
            BlendMode::Lighten => ((1.0 - qa) * cb + ca).max((1.0 - qb) * ca + cb),
        };
    }
    out[3] = 1.0 - (1.0 - qa) * (1.0 - qb);
    from_unit(out)
}

#[cfg(test)]
#[path = "../../tests/unit/filters/blend.rs"]
mod tests;
