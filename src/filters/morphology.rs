use crate::config::Limits;
use crate::foundation::core::IRect;
use crate::foundation::error::{SvgraphError, SvgraphResult};
use crate::render::surface::Surface;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MorphologyOp {
    #[default]
    Erode,
    Dilate,
}

impl MorphologyOp {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "erode" => Some(Self::Erode),
            "dilate" => Some(Self::Dilate),
            _ => None,
        }
    }
}

/// Per-channel min (erode) or max (dilate) over an elliptical neighbourhood with device
/// radii `rx`, `ry`. A non-positive radius leaves the input unchanged.
///
/// Each row of the ellipse is a horizontal run reduced with a van Herk/Gil-Werman sliding
/// window, so the cost per pixel is linear in `ry` and independent of `rx`.
pub fn apply(
    input: Surface,
    op: MorphologyOp,
    rx: f64,
    ry: f64,
    bounds: IRect,
    limits: &Limits,
) -> SvgraphResult<Surface> {
    if !(rx > 0.0 && ry > 0.0) {
        return Ok(input);
    }
    let (rx, ry) = (rx.round().max(0.0), ry.round().max(0.0));
    if rx.max(ry) > f64::from(limits.max_blur_radius) {
        return Err(SvgraphError::limit(format!(
            "morphology radius {} exceeds {}",
            rx.max(ry),
            limits.max_blur_radius
        )));
    }
    let (rx, ry) = (rx as i32, ry as i32);
    let bounds = bounds.intersect(input.bounds());
    let mut out = Surface::new(input.width(), input.height())?;
    if bounds.is_empty() {
        return Ok(out);
    }
    let row_len = bounds.width() as usize;
    let work = u64::from(bounds.width().unsigned_abs())
        * u64::from(bounds.height().unsigned_abs())
        * (2 * u64::from(ry.unsigned_abs()) + 1);
    limits.check_filter_work("morphology", work)?;

    let runs = row_half_widths(rx, ry);
    let mut window = SlidingWindow::default();
    let mut src = vec![[0u8; 4]; row_len];
    let mut reduced = vec![[0u8; 4]; row_len];
    let mut acc = vec![op.identity(); row_len];

    for y in bounds.y0..bounds.y1 {
        acc.fill(op.identity());
        for (dy, &half) in (-ry..=ry).zip(&runs) {
            let sy = y + dy;
            if sy < bounds.y0 || sy >= bounds.y1 {
                // Rows outside the region read as transparent.
                for a in &mut acc {
                    *a = op.combine(*a, [0; 4]);
                }
                continue;
            }
            for (x, px) in (bounds.x0..bounds.x1).zip(src.iter_mut()) {
                *px = input.pixel(x, sy);
            }
            window.reduce(op, &src, half as usize, &mut reduced);
            for (a, r) in acc.iter_mut().zip(&reduced) {
                *a = op.combine(*a, *r);
            }
        }
        for (x, px) in (bounds.x0..bounds.x1).zip(&acc) {
            out.set_pixel(x, y, *px);
        }
    }
    Ok(out)
}

impl MorphologyOp {
    fn identity(self) -> [u8; 4] {
        match self {
            Self::Erode => [255; 4],
            Self::Dilate => [0; 4],
        }
    }

    fn combine(self, a: [u8; 4], b: [u8; 4]) -> [u8; 4] {
        std::array::from_fn(|c| match self {
            Self::Erode => a[c].min(b[c]),
            Self::Dilate => a[c].max(b[c]),
        })
    }
}

/// Half-width of the ellipse run at each row offset in `-ry..=ry`.
fn row_half_widths(rx: i32, ry: i32) -> Vec<i32> {
    (-ry..=ry)
        .map(|dy| {
            let ny = if ry == 0 { 0.0 } else { f64::from(dy) / f64::from(ry) };
            (0..=rx)
                .rev()
                .find(|&dx| {
                    let nx = if rx == 0 { 0.0 } else { f64::from(dx) / f64::from(rx) };
                    nx * nx + ny * ny <= 1.0
                })
                .unwrap_or(0)
        })
        .collect()
}

/// Scratch rows for the block prefix/suffix reduction, reused across rows.
#[derive(Default)]
struct SlidingWindow {
    padded: Vec<[u8; 4]>,
    prefix: Vec<[u8; 4]>,
    suffix: Vec<[u8; 4]>,
}

impl SlidingWindow {
    /// `out[x]` reduces `src[x - half..=x + half]`; positions outside `src` are transparent.
    fn reduce(&mut self, op: MorphologyOp, src: &[[u8; 4]], half: usize, out: &mut [[u8; 4]]) {
        if half == 0 {
            out.copy_from_slice(src);
            return;
        }
        let Self {
            padded,
            prefix,
            suffix,
        } = self;
        let k = 2 * half + 1;
        let n = src.len() + 2 * half;

        padded.clear();
        padded.resize(half, [0; 4]);
        padded.extend_from_slice(src);
        padded.resize(n, [0; 4]);

        prefix.clear();
        prefix.resize(n, [0; 4]);
        for i in 0..n {
            prefix[i] = if i % k == 0 {
                padded[i]
            } else {
                op.combine(prefix[i - 1], padded[i])
            };
        }
        suffix.clear();
        suffix.resize(n, [0; 4]);
        for i in (0..n).rev() {
            suffix[i] = if i == n - 1 || (i + 1) % k == 0 {
                padded[i]
            } else {
                op.combine(suffix[i + 1], padded[i])
            };
        }
        for (x, o) in out.iter_mut().enumerate() {
            *o = op.combine(suffix[x], prefix[x + k - 1]);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/filters/morphology.rs"]
mod tests;
