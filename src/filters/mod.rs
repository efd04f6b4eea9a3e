//! Raster filter pipeline.
//!
//! A [`Filter`] is an ordered list of [`Primitive`]s. Each primitive reads one or two named
//! inputs, writes a new buffer into the evaluation context, and the last buffer written is the
//! filter's result. All buffers are canvas-sized premultiplied RGBA8 surfaces in device space.

pub mod blend;
pub(crate) mod build;
pub mod color_matrix;
pub mod component_transfer;
pub mod composite;
pub mod context;
pub mod convolve;
pub mod displacement;
pub mod gaussian_blur;
pub mod image;
pub mod lighting;
pub mod morphology;
pub mod offset;
mod pixel;
pub mod tile;
pub mod turbulence;

use tracing::{debug, warn};

use crate::attr::{AspectRatio, Color};
use crate::foundation::core::IRect;
use crate::foundation::error::SvgraphResult;
use crate::render::surface::Surface;
use crate::scene::node::{Region, Units};

pub use blend::BlendMode;
pub use color_matrix::ColorMatrixKind;
pub use component_transfer::TransferFn;
pub use composite::CompositeOperator;
pub use context::{FilterContext, FilterEnv};
pub use convolve::EdgeMode;
pub use displacement::ChannelSelector;
pub use lighting::{LightSource, LightingKind};
pub use morphology::MorphologyOp;
pub use turbulence::TurbulenceKind;

/// Index of a filter in its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilterId(pub(crate) u32);

impl FilterId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Where a primitive reads its pixels from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    SourceGraphic,
    SourceAlpha,
    BackgroundImage,
    BackgroundAlpha,
    FillPaint,
    StrokePaint,
    /// A previous primitive's `result` name.
    Named(String),
    /// The preceding primitive's output, or the source graphic for the first primitive.
    Previous,
}

impl Input {
    pub fn parse(s: Option<&str>) -> Self {
        match s.map(str::trim) {
            None | Some("") => Self::Previous,
            Some("SourceGraphic") => Self::SourceGraphic,
            Some("SourceAlpha") => Self::SourceAlpha,
            Some("BackgroundImage") => Self::BackgroundImage,
            Some("BackgroundAlpha") => Self::BackgroundAlpha,
            Some("FillPaint") => Self::FillPaint,
            Some("StrokePaint") => Self::StrokePaint,
            Some(name) => Self::Named(name.to_string()),
        }
    }
}

/// Source of an `feImage` primitive.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Decoded at build time; `None` if loading failed.
    External(Option<std::sync::Arc<Surface>>),
    /// A document element rendered on demand.
    Node(String),
}

#[derive(Debug, Clone)]
pub enum PrimitiveKind {
    Blend {
        in1: Input,
        in2: Input,
        mode: BlendMode,
    },
    Composite {
        in1: Input,
        in2: Input,
        operator: CompositeOperator,
    },
    Merge {
        inputs: Vec<Input>,
    },
    ColorMatrix {
        input: Input,
        kind: ColorMatrixKind,
    },
    ComponentTransfer {
        input: Input,
        funcs: [TransferFn; 4],
    },
    ConvolveMatrix {
        input: Input,
        order_x: usize,
        order_y: usize,
        kernel: Vec<f64>,
        divisor: Option<f64>,
        bias: f64,
        target_x: Option<usize>,
        target_y: Option<usize>,
        edge_mode: EdgeMode,
        preserve_alpha: bool,
    },
    GaussianBlur {
        input: Input,
        std_dev: (f64, f64),
    },
    Offset {
        input: Input,
        dx: f64,
        dy: f64,
    },
    Morphology {
        input: Input,
        op: MorphologyOp,
        radius: (f64, f64),
    },
    Flood {
        color: Color,
        opacity: f64,
    },
    DisplacementMap {
        in1: Input,
        in2: Input,
        scale: f64,
        x_channel: ChannelSelector,
        y_channel: ChannelSelector,
    },
    Turbulence {
        base_frequency: (f64, f64),
        octaves: i32,
        seed: f64,
        stitch_tiles: bool,
        kind: TurbulenceKind,
    },
    Image {
        source: ImageSource,
        aspect: AspectRatio,
    },
    Lighting {
        input: Input,
        kind: LightingKind,
        surface_scale: f64,
        color: Color,
        /// The first light-source child; `None` renders transparent.
        light: Option<LightSource>,
    },
    Tile {
        input: Input,
    },
}

impl PrimitiveKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Blend { .. } => "feBlend",
            Self::Composite { .. } => "feComposite",
            Self::Merge { .. } => "feMerge",
            Self::ColorMatrix { .. } => "feColorMatrix",
            Self::ComponentTransfer { .. } => "feComponentTransfer",
            Self::ConvolveMatrix { .. } => "feConvolveMatrix",
            Self::GaussianBlur { .. } => "feGaussianBlur",
            Self::Offset { .. } => "feOffset",
            Self::Morphology { .. } => "feMorphology",
            Self::Flood { .. } => "feFlood",
            Self::DisplacementMap { .. } => "feDisplacementMap",
            Self::Turbulence { .. } => "feTurbulence",
            Self::Image { .. } => "feImage",
            Self::Lighting {
                kind: LightingKind::Diffuse { .. },
                ..
            } => "feDiffuseLighting",
            Self::Lighting { .. } => "feSpecularLighting",
            Self::Tile { .. } => "feTile",
        }
    }

    /// Every input this primitive reads, in reading order.
    pub fn inputs(&self) -> Vec<&Input> {
        match self {
            Self::Blend { in1, in2, .. }
            | Self::Composite { in1, in2, .. }
            | Self::DisplacementMap { in1, in2, .. } => vec![in1, in2],
            Self::Merge { inputs } => inputs.iter().collect(),
            Self::ColorMatrix { input, .. }
            | Self::ComponentTransfer { input, .. }
            | Self::ConvolveMatrix { input, .. }
            | Self::GaussianBlur { input, .. }
            | Self::Offset { input, .. }
            | Self::Morphology { input, .. }
            | Self::Lighting { input, .. }
            | Self::Tile { input } => vec![input],
            Self::Flood { .. } | Self::Turbulence { .. } | Self::Image { .. } => Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Primitive {
    pub kind: PrimitiveKind,
    /// Subregion overrides in primitive units; `None` falls back to the filter region.
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub result: Option<String>,
}

impl Primitive {
    pub fn new(kind: PrimitiveKind) -> Self {
        Self {
            kind,
            x: None,
            y: None,
            width: None,
            height: None,
            result: None,
        }
    }

    pub fn with_result(mut self, name: impl Into<String>) -> Self {
        self.result = Some(name.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct Filter {
    pub region: Region,
    pub primitive_units: Units,
    pub primitives: Vec<Primitive>,
}

impl Filter {
    /// An empty filter with the default `(-10%, -10%, 120%, 120%)` bounding-box region.
    pub fn new() -> Self {
        Self {
            region: Region {
                x: -0.1,
                y: -0.1,
                width: 1.2,
                height: 1.2,
                units: Units::ObjectBoundingBox,
            },
            primitive_units: Units::UserSpaceOnUse,
            primitives: Vec::new(),
        }
    }

    pub fn with_primitive(mut self, p: Primitive) -> Self {
        self.primitives.push(p);
        self
    }

    /// Whether any primitive reads `BackgroundImage` or `BackgroundAlpha`.
    pub fn reads_background(&self) -> bool {
        self.primitives.iter().any(|p| {
            p.kind
                .inputs()
                .iter()
                .any(|i| matches!(i, Input::BackgroundImage | Input::BackgroundAlpha))
        })
    }
}

impl Default for Filter {
    fn default() -> Self {
        Self::new()
    }
}

/// Run every primitive of `filter` in declaration order and return the final buffer.
///
/// A primitive that fails with a recoverable error produces a transparent buffer and the chain
/// continues; allocation failures abort the whole filter.
#[tracing::instrument(skip_all, fields(primitives = filter.primitives.len()))]
pub fn apply_filter(
    filter: &Filter,
    ctx: &mut FilterContext<'_>,
    env: &mut dyn FilterEnv,
) -> SvgraphResult<Surface> {
    let max = ctx.limits().max_filter_primitives;
    for (i, prim) in filter.primitives.iter().enumerate() {
        if i >= max {
            warn!(max, "filter primitive limit reached, ignoring the rest");
            break;
        }
        let bounds = ctx.subregion(prim);
        let surface = match apply_primitive(prim, ctx, env, bounds) {
            Ok(mut s) => {
                s.clear_outside(bounds);
                s
            }
            Err(e) if e.is_recoverable() => {
                warn!(primitive = prim.kind.name(), error = %e, "primitive skipped");
                ctx.transparent()?
            }
            Err(e) => return Err(e),
        };
        debug!(primitive = prim.kind.name(), ?bounds, "primitive evaluated");
        ctx.store(prim.result.as_deref(), surface, bounds);
    }
    ctx.take_result()
}

fn apply_primitive(
    prim: &Primitive,
    ctx: &FilterContext<'_>,
    env: &mut dyn FilterEnv,
    bounds: IRect,
) -> SvgraphResult<Surface> {
    match &prim.kind {
        PrimitiveKind::Blend { in1, in2, mode } => {
            blend::apply(&ctx.input(in1)?, &ctx.input(in2)?, *mode, bounds)
        }
        PrimitiveKind::Composite { in1, in2, operator } => {
            composite::apply(&ctx.input(in1)?, &ctx.input(in2)?, *operator, bounds)
        }
        PrimitiveKind::Merge { inputs } => {
            let mut layers = Vec::with_capacity(inputs.len());
            for i in inputs {
                layers.push(ctx.input(i)?);
            }
            composite::merge(ctx.transparent()?, &layers, bounds)
        }
        PrimitiveKind::ColorMatrix { input, kind } => {
            color_matrix::apply(ctx.input(input)?, kind, bounds)
        }
        PrimitiveKind::ComponentTransfer { input, funcs } => {
            component_transfer::apply(ctx.input(input)?, funcs, bounds)
        }
        PrimitiveKind::ConvolveMatrix {
            input,
            order_x,
            order_y,
            kernel,
            divisor,
            bias,
            target_x,
            target_y,
            edge_mode,
            preserve_alpha,
        } => {
            let params = convolve::Convolve {
                order_x: *order_x,
                order_y: *order_y,
                kernel,
                divisor: *divisor,
                bias: *bias,
                target_x: *target_x,
                target_y: *target_y,
                edge_mode: *edge_mode,
                preserve_alpha: *preserve_alpha,
            };
            convolve::apply(&ctx.input(input)?, &params, bounds, ctx.limits())
        }
        PrimitiveKind::GaussianBlur { input, std_dev } => {
            let (sx, sy) = ctx.scale_lengths(std_dev.0, std_dev.1);
            gaussian_blur::apply(ctx.input(input)?, sx, sy, bounds, ctx.limits())
        }
        PrimitiveKind::Offset { input, dx, dy } => {
            let d = ctx.transform_distance(*dx, *dy);
            offset::apply(&ctx.input(input)?, d.x, d.y)
        }
        PrimitiveKind::Morphology { input, op, radius } => {
            let (rx, ry) = ctx.scale_lengths(radius.0, radius.1);
            morphology::apply(ctx.input(input)?, *op, rx, ry, bounds, ctx.limits())
        }
        PrimitiveKind::Flood { color, opacity } => {
            let mut out = ctx.transparent()?;
            let px = color.with_alpha_factor(*opacity).to_rgba8_premul().to_array();
            for y in bounds.y0..bounds.y1 {
                for x in bounds.x0..bounds.x1 {
                    out.set_pixel(x, y, px);
                }
            }
            Ok(out)
        }
        PrimitiveKind::DisplacementMap {
            in1,
            in2,
            scale,
            x_channel,
            y_channel,
        } => {
            let (sx, sy) = ctx.scale_lengths(*scale, *scale);
            displacement::apply(
                &ctx.input(in1)?,
                &ctx.input(in2)?,
                (sx, sy),
                *x_channel,
                *y_channel,
                bounds,
            )
        }
        PrimitiveKind::Turbulence {
            base_frequency,
            octaves,
            seed,
            stitch_tiles,
            kind,
        } => {
            let params = turbulence::TurbulenceParams {
                base_frequency: *base_frequency,
                octaves: *octaves,
                seed: *seed,
                stitch_tiles: *stitch_tiles,
                kind: *kind,
            };
            turbulence::apply(ctx, &params, bounds)
        }
        PrimitiveKind::Image { source, aspect } => match ctx.subregion_user(prim) {
            Some(rect) => image::apply(ctx, env, source, *aspect, rect, bounds),
            None => ctx.transparent(),
        },
        PrimitiveKind::Lighting {
            input,
            kind,
            surface_scale,
            color,
            light,
        } => {
            let Some(light) = light else {
                return ctx.transparent();
            };
            lighting::apply(
                &ctx.input(input)?,
                ctx,
                kind,
                *surface_scale,
                *color,
                light,
                bounds,
            )
        }
        PrimitiveKind::Tile { input } => {
            let (src, src_bounds) = ctx.input_with_bounds(input)?;
            tile::apply(&src, src_bounds, bounds)
        }
    }
}
