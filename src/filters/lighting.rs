//! `feDiffuseLighting` and `feSpecularLighting`.
//!
//! The input's alpha channel is a height map scaled by `surfaceScale`. Normals come from Sobel
//! gradients; at the edges and corners of the primitive bounds the missing neighbours are
//! dropped and the remaining weights renormalised, which yields the usual edge and corner
//! kernels.

use crate::attr::Color;
use crate::foundation::core::{IRect, Point};
use crate::foundation::error::{SvgraphError, SvgraphResult};
use crate::foundation::math::premultiply;
use crate::render::surface::Surface;
use crate::transform::affine::mean_scale;

use super::context::FilterContext;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightingKind {
    Diffuse {
        diffuse_constant: f64,
    },
    Specular {
        specular_constant: f64,
        specular_exponent: f64,
    },
}

/// Light source in primitive units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightSource {
    Distant {
        azimuth: f64,
        elevation: f64,
    },
    Point {
        x: f64,
        y: f64,
        z: f64,
    },
    Spot {
        x: f64,
        y: f64,
        z: f64,
        points_at_x: f64,
        points_at_y: f64,
        points_at_z: f64,
        specular_exponent: f64,
        limiting_cone_angle: Option<f64>,
    },
}

type V3 = [f64; 3];

fn normalize(v: V3) -> V3 {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len == 0.0 {
        v
    } else {
        [v[0] / len, v[1] / len, v[2] / len]
    }
}

fn dot(a: V3, b: V3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Light source mapped to device space.
#[derive(Debug, Clone, Copy)]
enum DeviceLight {
    Distant(V3),
    Point(V3),
    Spot {
        pos: V3,
        dir: V3,
        exponent: f64,
        cos_cone: Option<f64>,
    },
}

impl DeviceLight {
    fn from_source(light: &LightSource, ctx: &FilterContext<'_>) -> Self {
        let paffine = ctx.paffine();
        let z_scale = mean_scale(paffine);
        let map = |x: f64, y: f64, z: f64| {
            let p = paffine * Point::new(x, y);
            [p.x, p.y, z * z_scale]
        };
        match *light {
            LightSource::Distant { azimuth, elevation } => {
                let (az, el) = (azimuth.to_radians(), elevation.to_radians());
                Self::Distant([az.cos() * el.cos(), az.sin() * el.cos(), el.sin()])
            }
            LightSource::Point { x, y, z } => Self::Point(map(x, y, z)),
            LightSource::Spot {
                x,
                y,
                z,
                points_at_x,
                points_at_y,
                points_at_z,
                specular_exponent,
                limiting_cone_angle,
            } => {
                let pos = map(x, y, z);
                let at = map(points_at_x, points_at_y, points_at_z);
                Self::Spot {
                    pos,
                    dir: normalize([at[0] - pos[0], at[1] - pos[1], at[2] - pos[2]]),
                    exponent: specular_exponent,
                    cos_cone: limiting_cone_angle.map(|a| a.abs().to_radians().cos()),
                }
            }
        }
    }

    /// Unit vector from the surface point towards the light.
    fn vector(&self, surface: V3) -> V3 {
        match self {
            Self::Distant(v) => *v,
            Self::Point(pos) | Self::Spot { pos, .. } => normalize([
                pos[0] - surface[0],
                pos[1] - surface[1],
                pos[2] - surface[2],
            ]),
        }
    }

    /// Light colour reaching the surface along `l`.
    fn color(&self, base: [f64; 3], l: V3) -> [f64; 3] {
        match self {
            Self::Distant(_) | Self::Point(_) => base,
            Self::Spot {
                dir,
                exponent,
                cos_cone,
                ..
            } => {
                let minus_l_dot_s = -dot(l, *dir);
                if minus_l_dot_s <= 0.0 {
                    return [0.0; 3];
                }
                if let Some(c) = cos_cone
                    && minus_l_dot_s < *c
                {
                    return [0.0; 3];
                }
                let f = minus_l_dot_s.powf(*exponent);
                [base[0] * f, base[1] * f, base[2] * f]
            }
        }
    }
}

/// Surface normal at `(x, y)` of the alpha height map restricted to `b`.
pub(crate) fn surface_normal(input: &Surface, b: IRect, x: i32, y: i32, scale: f64) -> V3 {
    let alpha = |xx: i32, yy: i32| f64::from(input.pixel(xx, yy)[3]) / 255.0;
    let left = if x > b.x0 { x - 1 } else { x };
    let right = if x + 1 < b.x1 { x + 1 } else { x };
    let top = if y > b.y0 { y - 1 } else { y };
    let bottom = if y + 1 < b.y1 { y + 1 } else { y };

    let mut nx = 0.0;
    if right > left {
        let (mut sum, mut wsum) = (0.0, 0.0);
        for yy in top..=bottom {
            let w = if yy == y { 2.0 } else { 1.0 };
            sum += w * (alpha(right, yy) - alpha(left, yy));
            wsum += w;
        }
        nx = -scale * 2.0 / (f64::from(right - left) * wsum) * sum;
    }
    let mut ny = 0.0;
    if bottom > top {
        let (mut sum, mut wsum) = (0.0, 0.0);
        for xx in left..=right {
            let w = if xx == x { 2.0 } else { 1.0 };
            sum += w * (alpha(xx, bottom) - alpha(xx, top));
            wsum += w;
        }
        ny = -scale * 2.0 / (f64::from(bottom - top) * wsum) * sum;
    }
    normalize([nx, ny, 1.0])
}

pub fn apply(
    input: &Surface,
    ctx: &FilterContext<'_>,
    kind: &LightingKind,
    surface_scale: f64,
    color: Color,
    light: &LightSource,
    bounds: IRect,
) -> SvgraphResult<Surface> {
    match *kind {
        LightingKind::Diffuse { diffuse_constant } if diffuse_constant < 0.0 => {
            return Err(SvgraphError::filter("diffuseConstant must not be negative"));
        }
        LightingKind::Specular {
            specular_constant,
            specular_exponent,
        } if specular_constant < 0.0 || !(1.0..=128.0).contains(&specular_exponent) => {
            return Err(SvgraphError::filter(
                "specularConstant must be >= 0 and specularExponent within 1..=128",
            ));
        }
        _ => {}
    }

    let light = DeviceLight::from_source(light, ctx);
    let base = [color.r, color.g, color.b];
    let mut out = ctx.transparent()?;
    let b = bounds.intersect(input.bounds());

    for y in b.y0..b.y1 {
        for x in b.x0..b.x1 {
            let n = surface_normal(input, b, x, y, surface_scale);
            let z = surface_scale * f64::from(input.pixel(x, y)[3]) / 255.0;
            let l = light.vector([f64::from(x), f64::from(y), z]);
            let lc = light.color(base, l);
            let px = match *kind {
                LightingKind::Diffuse { diffuse_constant } => {
                    let f = diffuse_constant * dot(n, l).max(0.0);
                    [lc[0] * f, lc[1] * f, lc[2] * f, 1.0]
                }
                LightingKind::Specular {
                    specular_constant,
                    specular_exponent,
                } => {
                    let h = normalize([l[0], l[1], l[2] + 1.0]);
                    let f = specular_constant * dot(n, h).max(0.0).powf(specular_exponent);
                    let (r, g, bl) = (lc[0] * f, lc[1] * f, lc[2] * f);
                    [r, g, bl, r.max(g).max(bl)]
                }
            };
            out.set_pixel(x, y, premultiply(px.map(|v| v.clamp(0.0, 1.0) as f32)));
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/filters/lighting.rs"]
mod tests;
