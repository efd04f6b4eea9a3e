//! Construction of filters and primitives from element attributes.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::assets::load_href;
use crate::attr::{
    Length, LengthUnit, parse_aspect_ratio, parse_iri, parse_length, parse_number,
    parse_number_list, parse_number_optional_number,
};
use crate::config::Options;
use crate::scene::attributes::Attributes;
use crate::scene::node::{Region, Units};
use crate::scene::state::State;

use super::{
    BlendMode, ChannelSelector, ColorMatrixKind, CompositeOperator, EdgeMode, Filter, ImageSource,
    Input, LightSource, LightingKind, MorphologyOp, Primitive, PrimitiveKind, TransferFn,
    TurbulenceKind,
};

/// Viewport and resolution used to resolve user-space lengths.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LengthEnv {
    pub(crate) dpi_x: f64,
    pub(crate) dpi_y: f64,
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) font_size: f64,
}

#[derive(Clone, Copy)]
enum Axis {
    X,
    Y,
}

impl LengthEnv {
    fn resolve(&self, len: Length, units: Units, axis: Axis) -> f64 {
        match units {
            Units::ObjectBoundingBox if len.is_percent() => len.value / 100.0,
            Units::ObjectBoundingBox => len.value,
            Units::UserSpaceOnUse => match axis {
                Axis::X => len.normalize(self.dpi_x, self.width, self.font_size),
                Axis::Y => len.normalize(self.dpi_y, self.height, self.font_size),
            },
        }
    }

    fn get(&self, attrs: &Attributes, name: &str, units: Units, axis: Axis) -> Option<f64> {
        let raw = attrs.get(name)?;
        match parse_length(raw) {
            Some(len) => Some(self.resolve(len, units, axis)),
            None => {
                debug!(name, value = raw, "ignoring malformed length");
                None
            }
        }
    }
}

pub(crate) fn units(attrs: &Attributes, name: &str, default: Units) -> Units {
    attrs.get(name).and_then(Units::parse).unwrap_or(default)
}

fn number(attrs: &Attributes, name: &str, default: f64) -> f64 {
    match attrs.get(name) {
        Some(raw) => parse_number(raw).unwrap_or_else(|| {
            debug!(name, value = raw, "ignoring malformed number");
            default
        }),
        None => default,
    }
}

fn pair(attrs: &Attributes, name: &str, default: (f64, f64)) -> (f64, f64) {
    attrs
        .get(name)
        .and_then(parse_number_optional_number)
        .unwrap_or(default)
}

fn input(attrs: &Attributes, name: &str) -> Input {
    Input::parse(attrs.get(name))
}

/// `x`/`y`/`width`/`height` of a filter or mask element in the units named by `units_attr`.
/// Missing values default to `(-10%, -10%, 120%, 120%)`.
pub(crate) fn region_from_attributes(
    attrs: &Attributes,
    env: &LengthEnv,
    units_attr: &str,
    default_units: Units,
) -> Region {
    let region_units = units(attrs, units_attr, default_units);
    let get = |name: &str, axis: Axis, percent: f64| {
        env.get(attrs, name, region_units, axis).unwrap_or_else(|| {
            env.resolve(Length::new(percent, LengthUnit::Percent), region_units, axis)
        })
    };
    Region {
        x: get("x", Axis::X, -10.0),
        y: get("y", Axis::Y, -10.0),
        width: get("width", Axis::X, 120.0),
        height: get("height", Axis::Y, 120.0),
        units: region_units,
    }
}

/// The `filter` element itself.
pub(crate) fn filter_from_attributes(attrs: &Attributes, env: &LengthEnv) -> Filter {
    Filter {
        region: region_from_attributes(attrs, env, "filterUnits", Units::ObjectBoundingBox),
        primitive_units: units(attrs, "primitiveUnits", Units::UserSpaceOnUse),
        primitives: Vec::new(),
    }
}

/// A filter primitive element. `None` for names that are not primitives.
pub(crate) fn primitive_from_element(
    name: &str,
    attrs: &Attributes,
    state: &State,
    primitive_units: Units,
    env: &LengthEnv,
    opts: &Options,
) -> Option<Primitive> {
    let kind = match name {
        "feBlend" => PrimitiveKind::Blend {
            in1: input(attrs, "in"),
            in2: input(attrs, "in2"),
            mode: attrs
                .get("mode")
                .and_then(BlendMode::parse)
                .unwrap_or_default(),
        },
        "feComposite" => {
            let mut operator = attrs
                .get("operator")
                .and_then(CompositeOperator::parse)
                .unwrap_or_default();
            if let CompositeOperator::Arithmetic { k1, k2, k3, k4 } = &mut operator {
                *k1 = number(attrs, "k1", 0.0);
                *k2 = number(attrs, "k2", 0.0);
                *k3 = number(attrs, "k3", 0.0);
                *k4 = number(attrs, "k4", 0.0);
            }
            PrimitiveKind::Composite {
                in1: input(attrs, "in"),
                in2: input(attrs, "in2"),
                operator,
            }
        }
        "feMerge" => PrimitiveKind::Merge { inputs: Vec::new() },
        "feColorMatrix" => {
            let values = attrs.get("values").map(parse_number_list).unwrap_or_default();
            PrimitiveKind::ColorMatrix {
                input: input(attrs, "in"),
                kind: ColorMatrixKind::from_type_and_values(attrs.get("type"), &values),
            }
        }
        "feComponentTransfer" => PrimitiveKind::ComponentTransfer {
            input: input(attrs, "in"),
            funcs: Default::default(),
        },
        "feConvolveMatrix" => {
            let (ox, oy) = pair(attrs, "order", (3.0, 3.0));
            let target = |n: &str| {
                attrs
                    .get(n)
                    .and_then(parse_number)
                    .filter(|v| *v >= 0.0)
                    .map(|v| v as usize)
            };
            PrimitiveKind::ConvolveMatrix {
                input: input(attrs, "in"),
                order_x: if ox >= 1.0 { ox as usize } else { 0 },
                order_y: if oy >= 1.0 { oy as usize } else { 0 },
                kernel: attrs
                    .get("kernelMatrix")
                    .map(parse_number_list)
                    .unwrap_or_default(),
                divisor: attrs.get("divisor").and_then(parse_number),
                bias: number(attrs, "bias", 0.0),
                target_x: target("targetX"),
                target_y: target("targetY"),
                edge_mode: attrs
                    .get("edgeMode")
                    .and_then(EdgeMode::parse)
                    .unwrap_or_default(),
                preserve_alpha: attrs.get("preserveAlpha").map(str::trim) == Some("true"),
            }
        }
        "feGaussianBlur" => PrimitiveKind::GaussianBlur {
            input: input(attrs, "in"),
            std_dev: pair(attrs, "stdDeviation", (0.0, 0.0)),
        },
        "feOffset" => PrimitiveKind::Offset {
            input: input(attrs, "in"),
            dx: number(attrs, "dx", 0.0),
            dy: number(attrs, "dy", 0.0),
        },
        "feErode" | "feDilate" | "feMorphology" => {
            let op = match name {
                "feErode" => MorphologyOp::Erode,
                "feDilate" => MorphologyOp::Dilate,
                _ => attrs
                    .get("operator")
                    .and_then(MorphologyOp::parse)
                    .unwrap_or_default(),
            };
            PrimitiveKind::Morphology {
                input: input(attrs, "in"),
                op,
                radius: pair(attrs, "radius", (0.0, 0.0)),
            }
        }
        "feFlood" => PrimitiveKind::Flood {
            color: state.flood_color,
            opacity: state.flood_opacity,
        },
        "feDisplacementMap" => PrimitiveKind::DisplacementMap {
            in1: input(attrs, "in"),
            in2: input(attrs, "in2"),
            scale: number(attrs, "scale", 0.0),
            x_channel: attrs
                .get("xChannelSelector")
                .and_then(ChannelSelector::parse)
                .unwrap_or_default(),
            y_channel: attrs
                .get("yChannelSelector")
                .and_then(ChannelSelector::parse)
                .unwrap_or_default(),
        },
        "feTurbulence" => PrimitiveKind::Turbulence {
            base_frequency: pair(attrs, "baseFrequency", (0.0, 0.0)),
            octaves: number(attrs, "numOctaves", 1.0) as i32,
            seed: number(attrs, "seed", 0.0),
            stitch_tiles: attrs.get("stitchTiles").map(str::trim) == Some("stitch"),
            kind: attrs
                .get("type")
                .and_then(TurbulenceKind::parse)
                .unwrap_or_default(),
        },
        "feImage" => PrimitiveKind::Image {
            source: image_source(attrs, opts),
            aspect: attrs
                .get("preserveAspectRatio")
                .and_then(parse_aspect_ratio)
                .unwrap_or_default(),
        },
        "feDiffuseLighting" => PrimitiveKind::Lighting {
            input: input(attrs, "in"),
            kind: LightingKind::Diffuse {
                diffuse_constant: number(attrs, "diffuseConstant", 1.0),
            },
            surface_scale: number(attrs, "surfaceScale", 1.0),
            color: state.lighting_color,
            light: None,
        },
        "feSpecularLighting" => PrimitiveKind::Lighting {
            input: input(attrs, "in"),
            kind: LightingKind::Specular {
                specular_constant: number(attrs, "specularConstant", 1.0),
                specular_exponent: number(attrs, "specularExponent", 1.0),
            },
            surface_scale: number(attrs, "surfaceScale", 1.0),
            color: state.lighting_color,
            light: None,
        },
        "feTile" => PrimitiveKind::Tile {
            input: input(attrs, "in"),
        },
        _ => return None,
    };

    Some(Primitive {
        kind,
        x: env.get(attrs, "x", primitive_units, Axis::X),
        y: env.get(attrs, "y", primitive_units, Axis::Y),
        width: env.get(attrs, "width", primitive_units, Axis::X),
        height: env.get(attrs, "height", primitive_units, Axis::Y),
        result: attrs
            .get("result")
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string),
    })
}

fn image_source(attrs: &Attributes, opts: &Options) -> ImageSource {
    let Some(href) = attrs.href() else {
        return ImageSource::External(None);
    };
    if let Some(id) = parse_iri(href) {
        return ImageSource::Node(id);
    }
    match load_href(href, opts) {
        Ok(surface) => ImageSource::External(Some(Arc::new(surface))),
        Err(e) => {
            warn!(error = %e, "feImage source could not be loaded");
            ImageSource::External(None)
        }
    }
}

/// Child elements that refine the most recent primitive: merge nodes, transfer functions and
/// light sources. Returns `false` when `name` is none of those.
pub(crate) fn apply_child(prim: &mut Primitive, name: &str, attrs: &Attributes) -> bool {
    match (name, &mut prim.kind) {
        ("feMergeNode", PrimitiveKind::Merge { inputs }) => {
            inputs.push(input(attrs, "in"));
            true
        }
        (
            "feFuncR" | "feFuncG" | "feFuncB" | "feFuncA",
            PrimitiveKind::ComponentTransfer { funcs, .. },
        ) => {
            let channel = match name {
                "feFuncR" => 0,
                "feFuncG" => 1,
                "feFuncB" => 2,
                _ => 3,
            };
            funcs[channel] = transfer_fn(attrs);
            true
        }
        (
            "feDistantLight" | "fePointLight" | "feSpotLight",
            PrimitiveKind::Lighting { light, .. },
        ) => {
            if light.is_none() {
                *light = Some(light_source(name, attrs));
            } else {
                debug!(name, "extra light source ignored");
            }
            true
        }
        _ => false,
    }
}

fn transfer_fn(attrs: &Attributes) -> TransferFn {
    let table = || {
        attrs
            .get("tableValues")
            .map(parse_number_list)
            .unwrap_or_default()
    };
    match attrs.get("type").map(str::trim) {
        Some("table") => TransferFn::Table(table()),
        Some("discrete") => TransferFn::Discrete(table()),
        Some("linear") => TransferFn::Linear {
            slope: number(attrs, "slope", 1.0),
            intercept: number(attrs, "intercept", 0.0),
        },
        Some("gamma") => TransferFn::Gamma {
            amplitude: number(attrs, "amplitude", 1.0),
            exponent: number(attrs, "exponent", 1.0),
            offset: number(attrs, "offset", 0.0),
        },
        _ => TransferFn::Identity,
    }
}

fn light_source(name: &str, attrs: &Attributes) -> LightSource {
    match name {
        "feDistantLight" => LightSource::Distant {
            azimuth: number(attrs, "azimuth", 0.0),
            elevation: number(attrs, "elevation", 0.0),
        },
        "fePointLight" => LightSource::Point {
            x: number(attrs, "x", 0.0),
            y: number(attrs, "y", 0.0),
            z: number(attrs, "z", 0.0),
        },
        _ => LightSource::Spot {
            x: number(attrs, "x", 0.0),
            y: number(attrs, "y", 0.0),
            z: number(attrs, "z", 0.0),
            points_at_x: number(attrs, "pointsAtX", 0.0),
            points_at_y: number(attrs, "pointsAtY", 0.0),
            points_at_z: number(attrs, "pointsAtZ", 0.0),
            specular_exponent: number(attrs, "specularExponent", 1.0),
            limiting_cone_angle: attrs.get("limitingConeAngle").and_then(parse_number),
        },
    }
}

#[cfg(test)]
#[path = "../../tests/unit/filters/build.rs"]
mod tests;
