use super::*;

#[test]
fn parses_hex_forms() {
    assert_eq!(parse_color("#f00"), Some(Color::rgba(1.0, 0.0, 0.0, 1.0)));
    assert_eq!(parse_color("#00ff00"), Some(Color::rgba(0.0, 1.0, 0.0, 1.0)));
    let c = parse_color("#0000ff80").unwrap();
    assert!((c.a - 128.0 / 255.0).abs() < 1e-9);
    assert_eq!(parse_color("#12345"), None);
    assert_eq!(parse_color("#ggg"), None);
}

#[test]
fn parses_functional_forms() {
    assert_eq!(
        parse_color("rgb(255, 0, 0)"),
        Some(Color::rgba(1.0, 0.0, 0.0, 1.0))
    );
    assert_eq!(
        parse_color("RGB(100%, 50%, 0%)"),
        Some(Color::rgba(1.0, 0.5, 0.0, 1.0))
    );
    let c = parse_color("rgba(0,0,0,0.25)").unwrap();
    assert_eq!(c.a, 0.25);
    let red = parse_color("hsl(0, 100%, 50%)").unwrap();
    assert!((red.r - 1.0).abs() < 1e-9 && red.g.abs() < 1e-9);
}

#[test]
fn parses_keywords_case_insensitively() {
    assert_eq!(parse_color("Red"), Some(Color::rgba(1.0, 0.0, 0.0, 1.0)));
    assert_eq!(parse_color("transparent"), Some(Color::TRANSPARENT));
    assert_eq!(parse_color("notacolor"), None);
}

#[test]
fn premul_conversion_scales_channels() {
    let p = Color::rgba(1.0, 0.5, 0.0, 0.5).to_rgba8_premul();
    assert_eq!(p.to_array(), [128, 64, 0, 128]);
}
