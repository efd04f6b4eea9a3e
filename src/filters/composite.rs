use crate::foundation::core::IRect;
use crate::foundation::error::SvgraphResult;
use crate::render::composite::over_in_place;
use crate::render::surface::Surface;

use super::pixel::{clamp_premul, from_unit, map2, to_unit};

/// Porter-Duff operator of `feComposite`; `in` is the source, `in2` the destination.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CompositeOperator {
    #[default]
    Over,
    In,
    Out,
    Atop,
    Xor,
    Arithmetic {
        k1: f64,
        k2: f64,
        k3: f64,
        k4: f64,
    },
}

impl CompositeOperator {
    /// Parse the `operator` keyword. Arithmetic coefficients are filled in by the caller.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "over" => Some(Self::Over),
            "in" => Some(Self::In),
            "out" => Some(Self::Out),
            "atop" => Some(Self::Atop),
            "xor" => Some(Self::Xor),
            "arithmetic" => Some(Self::Arithmetic {
                k1: 0.0,
                k2: 0.0,
                k3: 0.0,
                k4: 0.0,
            }),
            _ => None,
        }
    }
}

pub fn apply(
    src: &Surface,
    dst: &Surface,
    op: CompositeOperator,
    bounds: IRect,
) -> SvgraphResult<Surface> {
    map2(src, dst, bounds, |a, b| composite_pixel(a, b, op))
}

pub(crate) fn composite_pixel(a: [u8; 4], b: [u8; 4], op: CompositeOperator) -> [u8; 4] {
    let a = to_unit(a);
    let b = to_unit(b);
    let (qa, qb) = (a[3], b[3]);
    let mut out = [0.0; 4];
    for i in 0..4 {
        out[i] = match op {
            CompositeOperator::Over => a[i] + b[i] * (1.0 - qa),
            CompositeOperator::In => a[i] * qb,
            CompositeOperator::Out => a[i] * (1.0 - qb),
            CompositeOperator::Atop => a[i] * qb + b[i] * (1.0 - qa),
            CompositeOperator::Xor => a[i] * (1.0 - qb) + b[i] * (1.0 - qa),
            CompositeOperator::Arithmetic { k1, k2, k3, k4 } => {
                k1 * a[i] * b[i] + k2 * a[i] + k3 * b[i] + k4
            }
        };
    }
    clamp_premul(from_unit(out))
}

/// Stack `layers` bottom to top with source-over onto `base`.
pub fn merge(mut base: Surface, layers: &[Surface], bounds: IRect) -> SvgraphResult<Surface> {
    for layer in layers {
        over_in_place(&mut base, layer, bounds, 1.0)?;
    }
    base.clear_outside(bounds);
    Ok(base)
}

#[cfg(test)]
#[path = "../../tests/unit/filters/composite.rs"]
mod tests;
