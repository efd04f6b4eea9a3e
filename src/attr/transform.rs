use crate::foundation::core::{Affine, Vec2};

use super::number::parse_number_list;

/// Parse a `transform` attribute. The listed transforms compose left to right, so the rightmost
/// one is applied to points first.
pub fn parse_transform(s: &str) -> Option<Affine> {
    let mut out = Affine::IDENTITY;
    let mut rest = s.trim();
    while !rest.is_empty() {
        rest = rest.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == ',');
        if rest.is_empty() {
            break;
        }
        let open = rest.find('(')?;
        let close = rest.find(')')?;
        if close < open {
            return None;
        }
        let name = rest[..open].trim();
        let args = parse_number_list(&rest[open + 1..close]);
        out = out * transform_fn(name, &args)?;
        rest = &rest[close + 1..];
    }
    Some(out)
}

fn transform_fn(name: &str, args: &[f64]) -> Option<Affine> {
    Some(match (name, args) {
        ("matrix", [a, b, c, d, e, f]) => Affine::new([*a, *b, *c, *d, *e, *f]),
        ("translate", [tx]) => Affine::translate(Vec2::new(*tx, 0.0)),
        ("translate", [tx, ty]) => Affine::translate(Vec2::new(*tx, *ty)),
        ("scale", [s]) => Affine::scale(*s),
        ("scale", [sx, sy]) => Affine::scale_non_uniform(*sx, *sy),
        ("rotate", [a]) => Affine::rotate(a.to_radians()),
        ("rotate", [a, cx, cy]) => {
            let c = Vec2::new(*cx, *cy);
            Affine::translate(c) * Affine::rotate(a.to_radians()) * Affine::translate(-c)
        }
        ("skewX", [a]) => Affine::skew(a.to_radians().tan(), 0.0),
        ("skewY", [a]) => Affine::skew(0.0, a.to_radians().tan()),
        _ => return None,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/attr/transform.rs"]
mod tests;
