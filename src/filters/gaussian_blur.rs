//! Separable Gaussian blur.
//!
//! Small deviations use an explicit Q16 kernel. From a deviation of 2 pixels up, each axis is
//! three successive box blurs, which converge on a Gaussian and cost the same for any radius.
//! Pixels outside the primitive bounds read as transparent.

use crate::config::Limits;
use crate::foundation::core::IRect;
use crate::foundation::error::{SvgraphError, SvgraphResult};
use crate::render::surface::Surface;

const BOX_BLUR_THRESHOLD: f64 = 2.0;

pub fn apply(
    input: Surface,
    std_dev_x: f64,
    std_dev_y: f64,
    bounds: IRect,
    limits: &Limits,
) -> SvgraphResult<Surface> {
    if !(std_dev_x >= 0.0 && std_dev_y >= 0.0) {
        return Err(SvgraphError::filter("stdDeviation must not be negative"));
    }
    let bounds = bounds.intersect(input.bounds());
    if (std_dev_x == 0.0 && std_dev_y == 0.0) || bounds.is_empty() {
        let mut out = input;
        out.clear_outside(bounds);
        return Ok(out);
    }

    let passes_x = axis_passes(std_dev_x, limits)?;
    let passes_y = axis_passes(std_dev_y, limits)?;

    let (w, h) = (bounds.width() as usize, bounds.height() as usize);
    let mut buf = Vec::with_capacity(w * h);
    for y in bounds.y0..bounds.y1 {
        for x in bounds.x0..bounds.x1 {
            buf.push(input.pixel(x, y));
        }
    }

    if !passes_x.is_empty() {
        blur_lines(&mut buf, w, h, true, &passes_x);
    }
    if !passes_y.is_empty() {
        blur_lines(&mut buf, w, h, false, &passes_y);
    }

    let mut out = Surface::new(input.width(), input.height())?;
    for (i, px) in buf.into_iter().enumerate() {
        out.set_pixel(bounds.x0 + (i % w) as i32, bounds.y0 + (i / w) as i32, px);
    }
    Ok(out)
}

#[derive(Debug, Clone, PartialEq)]
enum LinePass {
    Kernel(Vec<u32>),
    Box { left: usize, right: usize },
}

fn axis_passes(sigma: f64, limits: &Limits) -> SvgraphResult<Vec<LinePass>> {
    if sigma <= 0.0 {
        return Ok(Vec::new());
    }
    let radius = (sigma * 3.0).ceil();
    if radius > f64::from(limits.max_blur_radius) {
        return Err(SvgraphError::limit(format!(
            "blur radius {radius} exceeds {}",
            limits.max_blur_radius
        )));
    }
    if sigma < BOX_BLUR_THRESHOLD {
        return Ok(vec![LinePass::Kernel(gaussian_kernel_q16(radius as u32, sigma))]);
    }
    let d = (sigma * 3.0 * (2.0 * std::f64::consts::PI).sqrt() / 4.0 + 0.5).floor() as usize;
    let half = d / 2;
    if d % 2 == 1 {
        Ok(vec![LinePass::Box { left: half, right: half }; 3])
    } else {
        Ok(vec![
            LinePass::Box {
                left: half,
                right: half - 1,
            },
            LinePass::Box {
                left: half - 1,
                right: half,
            },
            LinePass::Box {
                left: half,
                right: half,
            },
        ])
    }
}

fn gaussian_kernel_q16(radius: u32, sigma: f64) -> Vec<u32> {
    if radius == 0 {
        return vec![1 << 16];
    }
    let r = radius as i32;
    let denom = 2.0 * sigma * sigma;
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = f64::from(i);
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights_f.iter().sum();

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }
    weights
}

fn blur_lines(buf: &mut [[u8; 4]], w: usize, h: usize, horizontal: bool, passes: &[LinePass]) {
    let (lines, len) = if horizontal { (h, w) } else { (w, h) };
    let index = |line: usize, i: usize| if horizontal { line * w + i } else { i * w + line };
    let mut a = vec![[0u8; 4]; len];
    let mut b = vec![[0u8; 4]; len];
    for line in 0..lines {
        for (i, px) in a.iter_mut().enumerate() {
            *px = buf[index(line, i)];
        }
        for pass in passes {
            match pass {
                LinePass::Kernel(k) => kernel_pass(&a, &mut b, k),
                LinePass::Box { left, right } => box_pass(&a, &mut b, *left, *right),
            }
            std::mem::swap(&mut a, &mut b);
        }
        for (i, px) in a.iter().enumerate() {
            buf[index(line, i)] = *px;
        }
    }
}

fn kernel_pass(src: &[[u8; 4]], dst: &mut [[u8; 4]], k: &[u32]) {
    let radius = (k.len() / 2) as isize;
    let n = src.len() as isize;
    for (x, out) in dst.iter_mut().enumerate() {
        let mut acc = [0u64; 4];
        for (ki, &kw) in k.iter().enumerate() {
            let sx = x as isize + ki as isize - radius;
            if sx < 0 || sx >= n {
                continue;
            }
            let px = src[sx as usize];
            for c in 0..4 {
                acc[c] += u64::from(kw) * u64::from(px[c]);
            }
        }
        *out = acc.map(q16_to_u8);
    }
}

/// Mean over `[x - left, x + right]`, treating samples past either end as transparent.
fn box_pass(src: &[[u8; 4]], dst: &mut [[u8; 4]], left: usize, right: usize) {
    let n = src.len() as isize;
    let d = (left + right + 1) as u32;
    let mut sum = [0u32; 4];
    for i in 0..=right.min(src.len().saturating_sub(1)) {
        for c in 0..4 {
            sum[c] += u32::from(src[i][c]);
        }
    }
    for x in 0..n {
        dst[x as usize] = sum.map(|s| ((s + d / 2) / d).min(255) as u8);
        let add = x + right as isize + 1;
        if add < n {
            for c in 0..4 {
                sum[c] += u32::from(src[add as usize][c]);
            }
        }
        let sub = x - left as isize;
        if sub >= 0 {
            for c in 0..4 {
                sum[c] -= u32::from(src[sub as usize][c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    v.min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/filters/gaussian_blur.rs"]
mod tests;
