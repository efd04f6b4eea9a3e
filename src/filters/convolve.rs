use crate::config::Limits;
use crate::foundation::core::IRect;
use crate::foundation::error::{SvgraphError, SvgraphResult};
use crate::foundation::math::{premultiply, unpremultiply};
use crate::render::surface::Surface;

use super::pixel::{clamp_premul, from_unit, to_unit};

/// How samples outside the input rectangle are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeMode {
    #[default]
    Duplicate,
    Wrap,
    None,
}

impl EdgeMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "duplicate" => Some(Self::Duplicate),
            "wrap" => Some(Self::Wrap),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Convolve<'a> {
    pub order_x: usize,
    pub order_y: usize,
    pub kernel: &'a [f64],
    pub divisor: Option<f64>,
    pub bias: f64,
    pub target_x: Option<usize>,
    pub target_y: Option<usize>,
    pub edge_mode: EdgeMode,
    pub preserve_alpha: bool,
}

impl Convolve<'_> {
    fn validate(&self, limits: &Limits) -> SvgraphResult<(usize, usize, f64)> {
        if self.order_x == 0 || self.order_y == 0 {
            return Err(SvgraphError::filter("convolveMatrix order must be positive"));
        }
        let cells = self.order_x.saturating_mul(self.order_y);
        if cells > limits.max_kernel_cells {
            return Err(SvgraphError::limit(format!(
                "convolveMatrix kernel of {cells} cells exceeds {}",
                limits.max_kernel_cells
            )));
        }
        if self.kernel.len() != cells {
            return Err(SvgraphError::filter(format!(
                "convolveMatrix expects {cells} kernel values, got {}",
                self.kernel.len()
            )));
        }
        let tx = self.target_x.unwrap_or(self.order_x / 2);
        let ty = self.target_y.unwrap_or(self.order_y / 2);
        if tx >= self.order_x || ty >= self.order_y {
            return Err(SvgraphError::filter("convolveMatrix target outside the kernel"));
        }
        let divisor = match self.divisor {
            Some(d) if d != 0.0 => d,
            _ => {
                let sum: f64 = self.kernel.iter().sum();
                if sum == 0.0 { 1.0 } else { sum }
            }
        };
        Ok((tx, ty, divisor))
    }
}

pub fn apply(
    input: &Surface,
    params: &Convolve<'_>,
    bounds: IRect,
    limits: &Limits,
) -> SvgraphResult<Surface> {
    let (tx, ty, divisor) = params.validate(limits)?;
    let bounds = bounds.intersect(input.bounds());
    let mut out = Surface::new(input.width(), input.height())?;
    if bounds.is_empty() {
        return Ok(out);
    }
    let (ox, oy) = (params.order_x, params.order_y);
    let work = u64::from(bounds.width().unsigned_abs())
        * u64::from(bounds.height().unsigned_abs())
        * (ox * oy) as u64;
    limits.check_filter_work("convolveMatrix", work)?;

    for y in bounds.y0..bounds.y1 {
        for x in bounds.x0..bounds.x1 {
            let mut sum = [0.0f64; 4];
            for i in 0..oy {
                for j in 0..ox {
                    let sx = x - tx as i32 + j as i32;
                    let sy = y - ty as i32 + i as i32;
                    let Some(px) = sample(input, bounds, sx, sy, params.edge_mode) else {
                        continue;
                    };
                    let k = params.kernel[(ox - j - 1) + (oy - i - 1) * ox];
                    let c = if params.preserve_alpha {
                        let u = unpremultiply(px);
                        [f64::from(u[0]), f64::from(u[1]), f64::from(u[2]), f64::from(u[3])]
                    } else {
                        to_unit(px)
                    };
                    for ch in 0..4 {
                        sum[ch] += c[ch] * k;
                    }
                }
            }
            let mut res = sum.map(|v| v / divisor + params.bias);
            let px = if params.preserve_alpha {
                res[3] = f64::from(unpremultiply(input.pixel(x, y))[3]);
                premultiply(res.map(|v| v as f32))
            } else {
                clamp_premul(from_unit(res))
            };
            out.set_pixel(x, y, px);
        }
    }
    Ok(out)
}

fn sample(s: &Surface, b: IRect, x: i32, y: i32, mode: EdgeMode) -> Option<[u8; 4]> {
    if b.contains(x, y) {
        return Some(s.pixel(x, y));
    }
    match mode {
        EdgeMode::None => None,
        EdgeMode::Duplicate => Some(s.pixel(x.clamp(b.x0, b.x1 - 1), y.clamp(b.y0, b.y1 - 1))),
        EdgeMode::Wrap => {
            let wx = b.x0 + (x - b.x0).rem_euclid(b.width());
            let wy = b.y0 + (y - b.y0).rem_euclid(b.height());
            Some(s.pixel(wx, wy))
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/filters/convolve.rs"]
mod tests;
