use crate::foundation::core::IRect;
use crate::foundation::error::SvgraphResult;
use crate::foundation::math::{premultiply, unpremultiply};
use crate::render::surface::Surface;

use super::pixel::map_in_place;

#[derive(Debug, Clone, PartialEq)]
pub enum ColorMatrixKind {
    /// Row-major 4x5 matrix.
    Matrix(Box<[f64; 20]>),
    Saturate(f64),
    /// Degrees.
    HueRotate(f64),
    LuminanceToAlpha,
}

impl ColorMatrixKind {
    pub const IDENTITY: [f64; 20] = [
        1.0, 0.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 0.0, 1.0, 0.0,
    ];

    /// Build from the `type` and `values` attributes. A `matrix` with the wrong number of
    /// values is the identity.
    pub fn from_type_and_values(kind: Option<&str>, values: &[f64]) -> Self {
        match kind.map(str::trim).unwrap_or("matrix") {
            "saturate" => Self::Saturate(values.first().copied().unwrap_or(1.0)),
            "hueRotate" => Self::HueRotate(values.first().copied().unwrap_or(0.0)),
            "luminanceToAlpha" => Self::LuminanceToAlpha,
            _ => {
                let mut m = Self::IDENTITY;
                if values.len() == 20 {
                    m.copy_from_slice(values);
                }
                Self::Matrix(Box::new(m))
            }
        }
    }

    pub fn matrix(&self) -> [f64; 20] {
        match self {
            Self::Matrix(m) => **m,
            Self::Saturate(s) => {
                let s = *s;
                [
                    0.213 + 0.787 * s,
                    0.715 - 0.715 * s,
                    0.072 - 0.072 * s,
                    0.0,
                    0.0,
                    0.213 - 0.213 * s,
                    0.715 + 0.285 * s,
                    0.072 - 0.072 * s,
                    0.0,
                    0.0,
                    0.213 - 0.213 * s,
                    0.715 - 0.715 * s,
                    0.072 + 0.928 * s,
                    0.0,
                    0.0,
                    0.0,
                    0.0,
                    0.0,
                    1.0,
                    0.0,
                ]
            }
            Self::HueRotate(deg) => {
                let (sin, cos) = deg.to_radians().sin_cos();
                [
                    0.213 + cos * 0.787 - sin * 0.213,
                    0.715 - cos * 0.715 - sin * 0.715,
                    0.072 - cos * 0.072 + sin * 0.928,
                    0.0,
                    0.0,
                    0.213 - cos * 0.213 + sin * 0.143,
                    0.715 + cos * 0.285 + sin * 0.140,
                    0.072 - cos * 0.072 - sin * 0.283,
                    0.0,
                    0.0,
                    0.213 - cos * 0.213 - sin * 0.787,
                    0.715 - cos * 0.715 + sin * 0.715,
                    0.072 + cos * 0.928 + sin * 0.072,
                    0.0,
                    0.0,
                    0.0,
                    0.0,
                    0.0,
                    1.0,
                    0.0,
                ]
            }
            Self::LuminanceToAlpha => [
                0.0, 0.0, 0.0, 0.0, 0.0, //
                0.0, 0.0, 0.0, 0.0, 0.0, //
                0.0, 0.0, 0.0, 0.0, 0.0, //
                0.2125, 0.7154, 0.0721, 0.0, 0.0,
            ],
        }
    }
}

/// Apply the matrix to the unpremultiplied `(R, G, B, A, 1)` of every pixel in `bounds`.
pub fn apply(input: Surface, kind: &ColorMatrixKind, bounds: IRect) -> SvgraphResult<Surface> {
    let m = kind.matrix();
    Ok(map_in_place(input, bounds, |px| transform_pixel(&m, px)))
}

pub(crate) fn transform_pixel(m: &[f64; 20], px: [u8; 4]) -> [u8; 4] {
    let c = unpremultiply(px).map(f64::from);
    let mut out = [0f32; 4];
    for (row, o) in out.iter_mut().enumerate() {
        let r = &m[row * 5..row * 5 + 5];
        let v = r[0] * c[0] + r[1] * c[1] + r[2] * c[2] + r[3] * c[3] + r[4];
        *o = v as f32;
    }
    premultiply(out)
}

#[cfg(test)]
#[path = "../../tests/unit/filters/color_matrix.rs"]
mod tests;
