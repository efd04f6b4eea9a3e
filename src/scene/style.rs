//! Presentation attributes, the `style` attribute and conditional processing.

use tracing::debug;

use crate::attr::{
    parse_color, parse_iri, parse_length, parse_number, parse_overflow, parse_paint, LengthUnit,
};
use crate::scene::attributes::Attributes;
use crate::scene::state::{FillRule, LineCap, LineJoin, State, Visibility};

/// Ambient values needed to resolve lengths while capturing state.
#[derive(Clone, Copy, Debug)]
pub(crate) struct StyleEnv {
    pub(crate) dpi_x: f64,
    pub(crate) dpi_y: f64,
    pub(crate) viewport_width: f64,
    pub(crate) viewport_height: f64,
}

impl StyleEnv {
    fn diagonal(&self) -> f64 {
        ((self.viewport_width.powi(2) + self.viewport_height.powi(2)) / 2.0).sqrt()
    }

    fn dpi(&self) -> f64 {
        (self.dpi_x + self.dpi_y) / 2.0
    }
}

/// Split `a: b; c: d` into trimmed declarations. `!important` is dropped.
pub(crate) fn parse_style_declarations(s: &str) -> Vec<(&str, &str)> {
    s.split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim();
            let value = value.trim();
            let value = value
                .strip_suffix("!important")
                .map(str::trim_end)
                .unwrap_or(value);
            (!name.is_empty() && !value.is_empty()).then_some((name, value))
        })
        .collect()
}

/// Apply presentation attributes, then the `style` attribute, to `state`. `font-size` is
/// resolved before everything else because `em` lengths depend on it.
pub(crate) fn apply_style(state: &mut State, parent: &State, attrs: &Attributes, env: &StyleEnv) {
    let mut decls: Vec<(&str, &str)> = attrs.iter().filter(|(n, _)| *n != "style").collect();
    if let Some(style) = attrs.get("style") {
        decls.extend(parse_style_declarations(style));
    }
    for (name, value) in decls.iter().filter(|(n, _)| *n == "font-size") {
        apply_property(state, parent, name, value, env);
    }
    for (name, value) in decls.iter().filter(|(n, _)| *n != "font-size") {
        apply_property(state, parent, name, value, env);
    }
}

fn apply_property(state: &mut State, parent: &State, name: &str, value: &str, env: &StyleEnv) {
    if value == "inherit" {
        inherit_property(state, parent, name);
        return;
    }
    if !set_property(state, name, value, env) {
        debug!(property = name, value, "ignoring invalid property value");
    }
}

fn inherit_property(state: &mut State, parent: &State, name: &str) {
    macro_rules! inherit {
        ($f:ident) => {
            state.$f.set(parent.$f.value.clone())
        };
    }
    match name {
        "fill" => inherit!(fill),
        "fill-opacity" => inherit!(fill_opacity),
        "fill-rule" => inherit!(fill_rule),
        "clip-rule" => inherit!(clip_rule),
        "stroke" => inherit!(stroke),
        "stroke-opacity" => inherit!(stroke_opacity),
        "stroke-width" => inherit!(stroke_width),
        "stroke-linecap" => inherit!(stroke_linecap),
        "stroke-linejoin" => inherit!(stroke_linejoin),
        "stroke-miterlimit" => inherit!(stroke_miterlimit),
        "color" => inherit!(color),
        "font-size" => inherit!(font_size),
        "font-family" => inherit!(font_family),
        "visibility" => inherit!(visibility),
        "opacity" => state.opacity = parent.opacity,
        "overflow" => state.overflow = parent.overflow,
        _ => {}
    }
}

/// Returns `false` when a known property has an unparsable value.
fn set_property(state: &mut State, name: &str, value: &str, env: &StyleEnv) -> bool {
    fn unit_number(v: &str) -> Option<f64> {
        parse_number(v).map(|n| n.clamp(0.0, 1.0))
    }

    fn fill_rule(v: &str) -> Option<FillRule> {
        match v {
            "nonzero" => Some(FillRule::NonZero),
            "evenodd" => Some(FillRule::EvenOdd),
            _ => None,
        }
    }

    macro_rules! set {
        ($f:ident, $parsed:expr) => {
            match $parsed {
                Some(v) => {
                    state.$f.set(v);
                    true
                }
                None => false,
            }
        };
    }

    macro_rules! assign {
        ($f:ident, $parsed:expr) => {
            match $parsed {
                Some(v) => {
                    state.$f = v;
                    true
                }
                None => false,
            }
        };
    }

    let font_size = state.font_size.value;
    match name {
        "fill" => set!(fill, parse_paint(value)),
        "fill-opacity" => set!(fill_opacity, unit_number(value)),
        "fill-rule" => set!(fill_rule, fill_rule(value)),
        "clip-rule" => set!(clip_rule, fill_rule(value)),
        "stroke" => set!(stroke, parse_paint(value)),
        "stroke-opacity" => set!(stroke_opacity, unit_number(value)),
        "stroke-width" => set!(
            stroke_width,
            parse_length(value)
                .map(|l| l.normalize(env.dpi(), env.diagonal(), font_size))
                .filter(|w| *w >= 0.0)
        ),
        "stroke-linecap" => set!(
            stroke_linecap,
            match value {
                "butt" => Some(LineCap::Butt),
                "round" => Some(LineCap::Round),
                "square" => Some(LineCap::Square),
                _ => None,
            }
        ),
        "stroke-linejoin" => set!(
            stroke_linejoin,
            match value {
                "miter" => Some(LineJoin::Miter),
                "round" => Some(LineJoin::Round),
                "bevel" => Some(LineJoin::Bevel),
                _ => None,
            }
        ),
        "stroke-miterlimit" => set!(
            stroke_miterlimit,
            parse_number(value).filter(|m| *m >= 1.0)
        ),
        "color" => set!(color, parse_color(value)),
        "font-size" => set!(
            font_size,
            parse_length(value)
                .map(|l| match l.unit {
                    // Relative to the inherited font size, not a viewport.
                    LengthUnit::Percent => l.value * font_size / 100.0,
                    _ => l.normalize(env.dpi(), font_size, font_size),
                })
                .filter(|s| *s >= 0.0)
        ),
        "font-family" => set!(font_family, Some(value.trim_matches(['"', '\'']).to_string())),
        "visibility" => set!(
            visibility,
            match value {
                "visible" => Some(Visibility::Visible),
                "hidden" => Some(Visibility::Hidden),
                "collapse" => Some(Visibility::Collapse),
                _ => None,
            }
        ),
        "opacity" => assign!(opacity, unit_number(value)),
        "clip-path" => assign!(clip_path, optional_iri(value)),
        "mask" => assign!(mask, optional_iri(value)),
        "filter" => assign!(filter, optional_iri(value)),
        "overflow" => assign!(overflow, parse_overflow(value).map(Some)),
        "display" => {
            state.display = value != "none";
            true
        }
        "flood-color" => assign!(flood_color, parse_color(value)),
        "flood-opacity" => assign!(flood_opacity, unit_number(value)),
        "lighting-color" => assign!(lighting_color, parse_color(value)),
        // Not a style property: attributes such as `x`, `id` or `d` land here.
        _ => true,
    }
}

/// `none` clears the reference; anything else must be an IRI.
fn optional_iri(value: &str) -> Option<Option<String>> {
    if value == "none" {
        return Some(None);
    }
    parse_iri(value).map(Some)
}

const SUPPORTED_FEATURES: &[&str] = &[
    "http://www.w3.org/TR/SVG11/feature#BasicFilter",
    "http://www.w3.org/TR/SVG11/feature#BasicGraphicsAttribute",
    "http://www.w3.org/TR/SVG11/feature#BasicPaintAttribute",
    "http://www.w3.org/TR/SVG11/feature#BasicStructure",
    "http://www.w3.org/TR/SVG11/feature#ConditionalProcessing",
    "http://www.w3.org/TR/SVG11/feature#ContainerAttribute",
    "http://www.w3.org/TR/SVG11/feature#Filter",
    "http://www.w3.org/TR/SVG11/feature#Image",
    "http://www.w3.org/TR/SVG11/feature#Mask",
    "http://www.w3.org/TR/SVG11/feature#OpacityAttribute",
    "http://www.w3.org/TR/SVG11/feature#Shape",
    "http://www.w3.org/TR/SVG11/feature#Structure",
    "http://www.w3.org/TR/SVG11/feature#Style",
];

/// Evaluate `requiredFeatures`, `requiredExtensions` and `systemLanguage`.
pub(crate) fn conditions_hold(attrs: &Attributes, language: &str) -> bool {
    if let Some(features) = attrs.get("requiredFeatures") {
        let mut any = false;
        for f in features.split_ascii_whitespace() {
            any = true;
            if !SUPPORTED_FEATURES.contains(&f) {
                return false;
            }
        }
        if !any {
            return false;
        }
    }
    if attrs.get("requiredExtensions").is_some() {
        return false;
    }
    if let Some(langs) = attrs.get("systemLanguage") {
        let primary = |tag: &str| {
            tag.split('-')
                .next()
                .unwrap_or_default()
                .to_ascii_lowercase()
        };
        let want = primary(language);
        return langs
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .any(|t| t.eq_ignore_ascii_case(language) || primary(t) == want);
    }
    true
}

#[cfg(test)]
#[path = "../../tests/unit/scene/style.rs"]
mod tests;
