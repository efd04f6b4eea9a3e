//! Load and render configuration.
//!
//! Every field has a default, so a partial JSON document (or `{}`) is a valid configuration.

use std::path::PathBuf;

use crate::foundation::error::{SvgraphError, SvgraphResult};

/// Resource guards applied while building and rendering a document.
///
/// The defaults are sized for untrusted input. [`Limits::unlimited`] is the explicit override
/// for trusted documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum open-element depth during build and node recursion depth during render.
    pub max_nesting_depth: usize,
    /// Maximum length of a chain of nested references being drawn.
    pub max_reference_depth: usize,
    /// Maximum pixel count of any single surface allocation.
    pub max_surface_pixels: u64,
    /// Primitives beyond this count in one filter are ignored.
    pub max_filter_primitives: usize,
    /// Maximum `orderX * orderY` of a convolution kernel.
    pub max_kernel_cells: usize,
    /// Maximum blur/morphology radius in device pixels.
    pub max_blur_radius: u32,
    /// Maximum pixel visits a single neighbourhood primitive (morphology, convolution) may cost.
    pub max_filter_work: u64,
    /// Maximum number of reference acquisitions (`use` targets, clip paths, masks, filtered
    /// elements) in one render.
    pub max_reference_instances: usize,
    /// Maximum total pixels held by open offscreen layers at any one time.
    pub max_layer_pixels: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_nesting_depth: 256,
            max_reference_depth: 64,
            max_surface_pixels: 16_384 * 16_384 / 4,
            max_filter_primitives: 256,
            max_kernel_cells: 4096,
            max_blur_radius: 2048,
            max_filter_work: 1 << 30,
            max_reference_instances: 500_000,
            max_layer_pixels: 1 << 28,
        }
    }
}

impl Limits {
    pub fn unlimited() -> Self {
        Self {
            max_nesting_depth: usize::MAX,
            max_reference_depth: usize::MAX,
            max_surface_pixels: u64::MAX,
            max_filter_primitives: usize::MAX,
            max_kernel_cells: usize::MAX,
            max_blur_radius: u32::MAX,
            max_filter_work: u64::MAX,
            max_reference_instances: usize::MAX,
            max_layer_pixels: u64::MAX,
        }
    }

    pub(crate) fn check_surface(&self, width: u32, height: u32) -> SvgraphResult<()> {
        let px = u64::from(width) * u64::from(height);
        if px > self.max_surface_pixels {
            return Err(SvgraphError::limit(format!(
                "surface {width}x{height} exceeds {} pixels",
                self.max_surface_pixels
            )));
        }
        Ok(())
    }

    pub(crate) fn check_filter_work(&self, primitive: &str, work: u64) -> SvgraphResult<()> {
        if work > self.max_filter_work {
            return Err(SvgraphError::limit(format!(
                "{primitive} needs {work} pixel visits, limit is {}",
                self.max_filter_work
            )));
        }
        Ok(())
    }
}

/// Options shared by document loading and rendering.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Options {
    pub dpi_x: f64,
    pub dpi_y: f64,
    /// Viewport used when the outermost root has neither a size nor a viewBox.
    pub default_width: f64,
    pub default_height: f64,
    /// Language tag matched against `systemLanguage`.
    pub language: String,
    /// Directory relative image references are resolved against.
    pub base_dir: Option<PathBuf>,
    /// Straight-alpha background painted under the final surface.
    pub clear_rgba: Option<[u8; 4]>,
    pub limits: Limits,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            dpi_x: 90.0,
            dpi_y: 90.0,
            default_width: 100.0,
            default_height: 100.0,
            language: "en".to_string(),
            base_dir: None,
            clear_rgba: None,
            limits: Limits::default(),
        }
    }
}

impl Options {
    pub fn from_json_str(s: &str) -> SvgraphResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| SvgraphError::attribute(format!("invalid options JSON: {e}")))
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Apply `SVGRAPH_DPI` and `SVGRAPH_UNLIMITED=1` from the environment.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(dpi) = std::env::var("SVGRAPH_DPI")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|&d| d.is_finite() && d > 0.0)
        {
            self.dpi_x = dpi;
            self.dpi_y = dpi;
        }
        if std::env::var("SVGRAPH_UNLIMITED").is_ok_and(|v| v == "1") {
            self.limits = Limits::unlimited();
        }
        self
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
