use super::*;
use crate::attr::{Color, Paint};

fn env() -> StyleEnv {
    StyleEnv {
        dpi_x: 90.0,
        dpi_y: 90.0,
        viewport_width: 100.0,
        viewport_height: 100.0,
    }
}

fn styled(attrs: Attributes) -> State {
    let parent = State::default();
    let mut s = State::child_of(&parent);
    apply_style(&mut s, &parent, &attrs, &env());
    s
}

#[test]
fn style_attribute_overrides_presentation_attribute() {
    let s = styled(
        Attributes::new()
            .with("style", "fill: blue")
            .with("fill", "red"),
    );
    assert_eq!(s.fill.value, Paint::Color(Color::rgba(0.0, 0.0, 1.0, 1.0)));
    assert!(s.fill.specified);
}

#[test]
fn invalid_values_are_ignored() {
    let s = styled(
        Attributes::new()
            .with("fill", "not-a-color")
            .with("stroke-width", "-3")
            .with("opacity", "half"),
    );
    assert!(!s.fill.specified);
    assert_eq!(s.stroke_width.value, 1.0);
    assert_eq!(s.opacity, 1.0);
}

#[test]
fn em_lengths_use_the_element_font_size_regardless_of_order() {
    let s = styled(
        Attributes::new()
            .with("stroke-width", "2em")
            .with("font-size", "10"),
    );
    assert_eq!(s.stroke_width.value, 20.0);
}

#[test]
fn inherit_keyword_copies_and_flags() {
    let mut parent = State::default();
    parent.stroke_width.set(7.0);
    let mut s = State::child_of(&parent);
    apply_style(
        &mut s,
        &parent,
        &Attributes::new().with("stroke-width", "inherit"),
        &env(),
    );
    assert_eq!(s.stroke_width.value, 7.0);
    assert!(s.stroke_width.specified);
}

#[test]
fn references_and_display() {
    let s = styled(
        Attributes::new()
            .with("filter", "url(#f)")
            .with("clip-path", "none")
            .with("display", "none")
            .with("opacity", "0.5"),
    );
    assert_eq!(s.filter.as_deref(), Some("f"));
    assert_eq!(s.clip_path, None);
    assert!(!s.display);
    assert!(s.needs_layer());
}

#[test]
fn declarations_split_and_trim() {
    assert_eq!(
        parse_style_declarations("fill : red ; ;stroke:blue !important"),
        vec![("fill", "red"), ("stroke", "blue")]
    );
}

#[test]
fn conditional_attributes() {
    assert!(conditions_hold(&Attributes::new(), "en"));
    assert!(conditions_hold(
        &Attributes::new().with("systemLanguage", "fr, en-US"),
        "en"
    ));
    assert!(!conditions_hold(
        &Attributes::new().with("systemLanguage", "de"),
        "en"
    ));
    assert!(!conditions_hold(
        &Attributes::new().with("requiredExtensions", "http://example.org/ext"),
        "en"
    ));
    assert!(conditions_hold(
        &Attributes::new()
            .with("requiredFeatures", "http://www.w3.org/TR/SVG11/feature#Shape"),
        "en"
    ));
    assert!(!conditions_hold(
        &Attributes::new().with("requiredFeatures", ""),
        "en"
    ));
}
