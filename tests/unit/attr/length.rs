use super::*;

#[test]
fn absolute_units_scale_with_dpi() {
    let n = |s: &str| parse_normalized_length(s, 96.0, 200.0, 10.0).unwrap();
    assert_eq!(n("10"), 10.0);
    assert_eq!(n("10px"), 10.0);
    assert_eq!(n("1in"), 96.0);
    assert_eq!(n("72pt"), 96.0);
    assert_eq!(n("6pc"), 96.0);
    assert!((n("2.54cm") - 96.0).abs() < 1e-9);
    assert!((n("25.4mm") - 96.0).abs() < 1e-9);
}

#[test]
fn relative_units_use_reference_and_font() {
    let n = |s: &str| parse_normalized_length(s, 90.0, 200.0, 12.0).unwrap();
    assert_eq!(n("50%"), 100.0);
    assert_eq!(n("2em"), 24.0);
    assert_eq!(n("2ex"), 12.0);
}

#[test]
fn unknown_unit_is_rejected() {
    assert_eq!(parse_length("10furlongs"), None);
    assert_eq!(parse_length(""), None);
    assert!(parse_length("5%").unwrap().is_percent());
}
