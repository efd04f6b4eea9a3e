//! svgraph builds an SVG document into a node arena and renders it on the CPU.
//!
//! The pipeline has two phases over one [`Document`]:
//!
//! - Parse: [`Document::from_str`] walks the XML once, captures a cascading [`State`] per
//!   element and resolves forward `use` references after the last tag.
//! - Render: [`render`] walks the resolved tree, opening a discrete layer for every group with
//!   opacity, a clip path, a mask or a filter, and runs the raster filter pipeline on pop.
#![forbid(unsafe_code)]

pub mod assets;
pub mod attr;
pub mod config;
pub mod filters;
pub mod foundation;
pub mod render;
pub mod scene;
pub mod transform;

pub use crate::config::{Limits, Options};
pub use crate::foundation::core::{Affine, BezPath, IRect, Point, Rect, Rgba8Premul, Vec2};
pub use crate::foundation::error::{SvgraphError, SvgraphResult};
pub use crate::render::{
    DrawingContext, Rasterizer, RenderStats, Surface, VelloRasterizer, render, render_with_stats,
};
pub use crate::scene::{Document, NodeId, NodeKind, State};
