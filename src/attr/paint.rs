use super::color::{Color, parse_color};
use super::view_box::parse_iri;

#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    None,
    Color(Color),
    CurrentColor,
    /// Paint server reference with an optional fallback used when the server is not drawable.
    Server {
        id: String,
        fallback: Option<Box<Paint>>,
    },
}

pub fn parse_paint(s: &str) -> Option<Paint> {
    let s = s.trim();
    match s {
        "none" => return Some(Paint::None),
        "currentColor" => return Some(Paint::CurrentColor),
        _ => {}
    }
    if s.starts_with("url(") {
        let id = parse_iri(s)?;
        let close = s.find(')')?;
        let rest = s[close + 1..].trim();
        let fallback = if rest.is_empty() {
            None
        } else {
            Some(Box::new(parse_paint(rest)?))
        };
        return Some(Paint::Server { id, fallback });
    }
    parse_color(s).map(Paint::Color)
}
