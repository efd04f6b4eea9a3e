//! `feTurbulence`: the reference Perlin noise generator, seeded and optionally stitched.

use crate::foundation::core::{IRect, Point, Rect};
use crate::foundation::error::SvgraphResult;
use crate::foundation::math::premultiply;
use crate::render::surface::Surface;

use super::context::FilterContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurbulenceKind {
    FractalNoise,
    #[default]
    Turbulence,
}

impl TurbulenceKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "fractalNoise" => Some(Self::FractalNoise),
            "turbulence" => Some(Self::Turbulence),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurbulenceParams {
    pub base_frequency: (f64, f64),
    pub octaves: i32,
    pub seed: f64,
    pub stitch_tiles: bool,
    pub kind: TurbulenceKind,
}

const B_SIZE: usize = 0x100;
const BM: i64 = 0xff;
const PERLIN_N: i64 = 0x1000;

const RAND_M: i64 = 2_147_483_647;
const RAND_A: i64 = 16_807;
const RAND_Q: i64 = 127_773;
const RAND_R: i64 = 2_836;

/// Lattice and gradient tables for one seed.
pub struct NoiseGenerator {
    lattice: [usize; B_SIZE + B_SIZE + 2],
    gradient: [[[f64; 2]; B_SIZE + B_SIZE + 2]; 4],
}

#[derive(Debug, Clone, Copy)]
struct Stitch {
    width: i64,
    height: i64,
    wrap_x: i64,
    wrap_y: i64,
}

fn random(seed: i64) -> i64 {
    let r = RAND_A * (seed % RAND_Q) - RAND_R * (seed / RAND_Q);
    if r <= 0 { r + RAND_M } else { r }
}

fn setup_seed(seed: i64) -> i64 {
    let mut seed = seed;
    if seed <= 0 {
        seed = -(seed % (RAND_M - 1)) + 1;
    }
    if seed > RAND_M - 1 {
        seed = RAND_M - 1;
    }
    seed
}

fn s_curve(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

impl NoiseGenerator {
    pub fn new(seed: f64) -> Box<Self> {
        let mut g = Box::new(Self {
            lattice: [0; B_SIZE + B_SIZE + 2],
            gradient: [[[0.0; 2]; B_SIZE + B_SIZE + 2]; 4],
        });
        let mut seed = setup_seed(seed.trunc() as i64);
        for k in 0..4 {
            for i in 0..B_SIZE {
                g.lattice[i] = i;
                for j in 0..2 {
                    seed = random(seed);
                    g.gradient[k][i][j] =
                        ((seed % (2 * B_SIZE as i64)) - B_SIZE as i64) as f64 / B_SIZE as f64;
                }
                let [gx, gy] = g.gradient[k][i];
                let s = (gx * gx + gy * gy).sqrt();
                if s > 0.0 {
                    g.gradient[k][i] = [gx / s, gy / s];
                }
            }
        }
        for i in (1..B_SIZE).rev() {
            seed = random(seed);
            let j = (seed % B_SIZE as i64) as usize;
            g.lattice.swap(i, j);
        }
        for i in 0..B_SIZE + 2 {
            g.lattice[B_SIZE + i] = g.lattice[i];
            for k in 0..4 {
                g.gradient[k][B_SIZE + i] = g.gradient[k][i];
            }
        }
        g
    }

    fn noise2(&self, channel: usize, vx: f64, vy: f64, stitch: Option<&Stitch>) -> f64 {
        let t = vx + PERLIN_N as f64;
        let mut bx0 = (t as i64) & BM;
        let mut bx1 = (bx0 + 1) & BM;
        let rx0 = t - (t as i64) as f64;
        let rx1 = rx0 - 1.0;
        let t = vy + PERLIN_N as f64;
        let mut by0 = (t as i64) & BM;
        let mut by1 = (by0 + 1) & BM;
        let ry0 = t - (t as i64) as f64;
        let ry1 = ry0 - 1.0;

        if let Some(s) = stitch {
            if bx0 >= s.wrap_x {
                bx0 -= s.width;
            }
            if bx1 >= s.wrap_x {
                bx1 -= s.width;
            }
            if by0 >= s.wrap_y {
                by0 -= s.height;
            }
            if by1 >= s.wrap_y {
                by1 -= s.height;
            }
        }
        let (bx0, bx1, by0, by1) = (
            (bx0 & BM) as usize,
            (bx1 & BM) as usize,
            (by0 & BM) as usize,
            (by1 & BM) as usize,
        );

        let i = self.lattice[bx0];
        let j = self.lattice[bx1];
        let b00 = self.lattice[i + by0];
        let b10 = self.lattice[j + by0];
        let b01 = self.lattice[i + by1];
        let b11 = self.lattice[j + by1];
        let sx = s_curve(rx0);
        let sy = s_curve(ry0);

        let g = &self.gradient[channel];
        let u = rx0 * g[b00][0] + ry0 * g[b00][1];
        let v = rx1 * g[b10][0] + ry0 * g[b10][1];
        let a = lerp(sx, u, v);
        let u = rx0 * g[b01][0] + ry1 * g[b01][1];
        let v = rx1 * g[b11][0] + ry1 * g[b11][1];
        let b = lerp(sx, u, v);
        lerp(sy, a, b)
    }

    /// Sum of `octaves` noise layers at `point` (user space). `tile` is the stitching
    /// rectangle when stitching is on.
    pub fn turbulence(
        &self,
        channel: usize,
        point: Point,
        params: &TurbulenceParams,
        tile: Option<Rect>,
    ) -> f64 {
        let (mut fx, mut fy) = params.base_frequency;
        let mut stitch = None;
        if let Some(tile) = tile {
            if fx != 0.0 {
                fx = stitch_frequency(fx, tile.width());
            }
            if fy != 0.0 {
                fy = stitch_frequency(fy, tile.height());
            }
            let width = (tile.width() * fx + 0.5) as i64;
            let height = (tile.height() * fy + 0.5) as i64;
            stitch = Some(Stitch {
                width,
                height,
                wrap_x: (tile.x0 * fx + PERLIN_N as f64 + width as f64) as i64,
                wrap_y: (tile.y0 * fy + PERLIN_N as f64 + height as f64) as i64,
            });
        }

        let mut sum = 0.0;
        let (mut vx, mut vy) = (point.x * fx, point.y * fy);
        let mut ratio = 1.0;
        for _ in 0..params.octaves.max(0) {
            let n = self.noise2(channel, vx, vy, stitch.as_ref());
            sum += match params.kind {
                TurbulenceKind::FractalNoise => n / ratio,
                TurbulenceKind::Turbulence => n.abs() / ratio,
            };
            vx *= 2.0;
            vy *= 2.0;
            ratio *= 2.0;
            if let Some(s) = stitch.as_mut() {
                s.width *= 2;
                s.wrap_x = 2 * s.wrap_x - PERLIN_N;
                s.height *= 2;
                s.wrap_y = 2 * s.wrap_y - PERLIN_N;
            }
        }
        sum
    }
}

fn stitch_frequency(freq: f64, size: f64) -> f64 {
    if size <= 0.0 {
        return freq;
    }
    let lo = (size * freq).floor() / size;
    let hi = (size * freq).ceil() / size;
    if lo > 0.0 && freq / lo < hi / freq { lo } else { hi }
}

/// Synthesize noise over `bounds`. Device pixels map back to primitive space through the
/// inverse of the primitive transform.
pub fn apply(
    ctx: &FilterContext<'_>,
    params: &TurbulenceParams,
    bounds: IRect,
) -> SvgraphResult<Surface> {
    let mut out = ctx.transparent()?;
    let bounds = bounds.intersect(out.bounds());
    let (fx, fy) = params.base_frequency;
    if bounds.is_empty() || fx < 0.0 || fy < 0.0 {
        return Ok(out);
    }
    let paffine = ctx.paffine();
    if paffine.determinant() == 0.0 {
        return Ok(out);
    }
    let inverse = paffine.inverse();
    let tile = params
        .stitch_tiles
        .then(|| inverse.transform_rect_bbox(bounds.to_rect()));
    let noise = NoiseGenerator::new(params.seed);

    for y in bounds.y0..bounds.y1 {
        for x in bounds.x0..bounds.x1 {
            let p = inverse * Point::new(f64::from(x), f64::from(y));
            let mut rgba = [0f32; 4];
            for (ch, v) in rgba.iter_mut().enumerate() {
                let n = noise.turbulence(ch, p, params, tile);
                let n = match params.kind {
                    TurbulenceKind::FractalNoise => (n + 1.0) / 2.0,
                    TurbulenceKind::Turbulence => n,
                };
                *v = n.clamp(0.0, 1.0) as f32;
            }
            out.set_pixel(x, y, premultiply(rgba));
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/filters/turbulence.rs"]
mod tests;
