use super::*;
use crate::foundation::core::Point;

#[test]
fn view_box_requires_positive_size() {
    assert_eq!(
        parse_view_box("0 0 10 20"),
        Some(ViewBox {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 20.0
        })
    );
    assert_eq!(parse_view_box("0 0 0 20"), None);
    assert_eq!(parse_view_box("0 0 10"), None);
}

#[test]
fn aspect_ratio_keywords() {
    assert_eq!(parse_aspect_ratio("xMidYMid"), Some(AspectRatio::default()));
    let a = parse_aspect_ratio("xMinYMax slice").unwrap();
    assert_eq!(a.align, Some((Align1D::Min, Align1D::Max)));
    assert!(a.slice);
    assert_eq!(parse_aspect_ratio("none").unwrap().align, None);
    assert_eq!(parse_aspect_ratio("xMinYMax sideways"), None);
    assert_eq!(parse_aspect_ratio("xLowYMid"), None);
}

#[test]
fn meet_centers_wide_content() {
    // 20x10 content into a 10x10 viewport: scaled to 10x5, centered vertically.
    let (x, y, w, h) = AspectRatio::default().fit(20.0, 10.0, 0.0, 0.0, 10.0, 10.0);
    assert_eq!((x, y, w, h), (0.0, 2.5, 10.0, 5.0));
}

#[test]
fn slice_covers_viewport() {
    let a = AspectRatio {
        align: Some((Align1D::Min, Align1D::Min)),
        slice: true,
    };
    let (x, y, w, h) = a.fit(20.0, 10.0, 0.0, 0.0, 10.0, 10.0);
    assert_eq!((x, y, w, h), (0.0, 0.0, 20.0, 10.0));
}

#[test]
fn view_box_transform_maps_corners() {
    let vb = parse_view_box("10 10 100 100").unwrap();
    let t = view_box_transform(vb, AspectRatio::default(), 0.0, 0.0, 50.0, 50.0);
    let p = t * Point::new(110.0, 110.0);
    assert!((p.x - 50.0).abs() < 1e-9 && (p.y - 50.0).abs() < 1e-9);
    let o = t * Point::new(10.0, 10.0);
    assert!(o.x.abs() < 1e-9 && o.y.abs() < 1e-9);
}

#[test]
fn iri_forms() {
    assert_eq!(parse_iri("url(#blur)"), Some("blur".to_string()));
    assert_eq!(parse_iri("url('#a b')"), Some("a b".to_string()));
    assert_eq!(parse_iri("#x"), Some("x".to_string()));
    assert_eq!(parse_iri("url(other.svg#x)"), None);
    assert_eq!(parse_iri("none"), None);
}

#[test]
fn overflow_keywords() {
    assert_eq!(parse_overflow("visible"), Some(true));
    assert_eq!(parse_overflow("hidden"), Some(false));
    assert_eq!(parse_overflow("inherit"), None);
}
