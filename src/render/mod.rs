//! Render pass: surfaces, the discrete-layer compositing context and the node dispatcher.

pub mod composite;
pub mod context;
pub mod draw;
pub mod pool;
pub mod raster;
pub mod surface;

pub use context::{DrawingContext, LayerEffects, RenderStats};
pub use draw::{render, render_with_stats};
pub use pool::SurfacePool;
pub use raster::{PathStyle, Rasterizer, StrokeStyle, VelloRasterizer};
pub use surface::Surface;
