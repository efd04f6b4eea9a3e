use std::path::{Path, PathBuf};

use anyhow::Context;
use base64::Engine as _;

use crate::config::Options;
use crate::foundation::error::{SvgraphError, SvgraphResult};
use crate::render::surface::Surface;

use super::decode::{decode_image, decode_svg};

/// Load the image an `href` points at: a `data:` URI or a file relative to `base_dir`.
pub fn load_href(href: &str, opts: &Options) -> SvgraphResult<Surface> {
    let surface = if let Some((mime, bytes)) = parse_data_uri(href) {
        decode_bytes(&bytes, Some(&mime))?
    } else {
        let path = resolve_path(href, opts.base_dir.as_deref())?;
        let bytes = std::fs::read(&path)
            .with_context(|| format!("read image '{}'", path.display()))?;
        let is_svg = path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
        decode_bytes(&bytes, is_svg.then_some("image/svg+xml"))?
    };
    opts.limits
        .check_surface(surface.width(), surface.height())?;
    Ok(surface)
}

fn decode_bytes(bytes: &[u8], mime: Option<&str>) -> SvgraphResult<Surface> {
    match mime {
        Some(m) if m.contains("svg") => decode_svg(bytes),
        _ => decode_image(bytes),
    }
}

fn resolve_path(href: &str, base_dir: Option<&Path>) -> SvgraphResult<PathBuf> {
    let href = href.strip_prefix("file://").unwrap_or(href);
    if href.is_empty() || href.contains("://") {
        return Err(SvgraphError::not_found(format!("unsupported image reference '{href}'")));
    }
    let p = Path::new(href);
    Ok(match base_dir {
        Some(base) if p.is_relative() => base.join(p),
        _ => p.to_path_buf(),
    })
}

/// Split a `data:` URI into its media type and decoded payload.
pub(crate) fn parse_data_uri(uri: &str) -> Option<(String, Vec<u8>)> {
    let rest = uri.trim().strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header
        .split(';')
        .next()
        .filter(|v| !v.is_empty())
        .unwrap_or("text/plain")
        .to_string();
    let data = if header.ends_with(";base64") {
        let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        base64::engine::general_purpose::STANDARD
            .decode(compact)
            .ok()?
    } else {
        payload.as_bytes().to_vec()
    };
    Some((mime, data))
}
