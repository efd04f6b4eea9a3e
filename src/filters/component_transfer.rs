use crate::foundation::core::IRect;
use crate::foundation::error::SvgraphResult;
use crate::foundation::math::{premultiply, unpremultiply};
use crate::render::surface::Surface;

use super::pixel::map_in_place;

/// Transfer function of one channel (`feFuncR`/`G`/`B`/`A`).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TransferFn {
    #[default]
    Identity,
    Table(Vec<f64>),
    Discrete(Vec<f64>),
    Linear {
        slope: f64,
        intercept: f64,
    },
    Gamma {
        amplitude: f64,
        exponent: f64,
        offset: f64,
    },
}

impl TransferFn {
    pub fn eval(&self, c: f64) -> f64 {
        match self {
            Self::Identity => c,
            Self::Table(v) => match v.len() {
                0 => c,
                1 => v[0],
                n => {
                    let segs = (n - 1) as f64;
                    let k = ((c * segs).floor() as usize).min(n - 2);
                    let t = c * segs - k as f64;
                    v[k] + t * (v[k + 1] - v[k])
                }
            },
            Self::Discrete(v) => match v.len() {
                0 => c,
                n => {
                    let k = ((c * n as f64).floor() as usize).min(n - 1);
                    v[k]
                }
            },
            Self::Linear { slope, intercept } => slope * c + intercept,
            Self::Gamma {
                amplitude,
                exponent,
                offset,
            } => amplitude * c.powf(*exponent) + offset,
        }
    }
}

/// Apply `funcs` (R, G, B, A) to the unpremultiplied channels.
pub fn apply(input: Surface, funcs: &[TransferFn; 4], bounds: IRect) -> SvgraphResult<Surface> {
    if funcs.iter().all(|f| *f == TransferFn::Identity) {
        let mut out = input;
        out.clear_outside(bounds);
        return Ok(out);
    }
    Ok(map_in_place(input, bounds, |px| {
        let c = unpremultiply(px);
        let mut out = [0f32; 4];
        for i in 0..4 {
            out[i] = funcs[i].eval(f64::from(c[i])).clamp(0.0, 1.0) as f32;
        }
        premultiply(out)
    }))
}

#[cfg(test)]
#[path = "../../tests/unit/filters/component_transfer.rs"]
mod tests;
