use super::*;

#[test]
fn empty_json_yields_defaults() {
    let opts = Options::from_json_str("{}").unwrap();
    assert_eq!(opts, Options::default());
    assert_eq!(opts.dpi_x, 90.0);
    assert_eq!(opts.limits.max_nesting_depth, 256);
}

#[test]
fn partial_limits_keep_remaining_defaults() {
    let opts =
        Options::from_json_str(r#"{ "dpi_x": 72, "limits": { "max_reference_depth": 3 } }"#)
            .unwrap();
    assert_eq!(opts.dpi_x, 72.0);
    assert_eq!(opts.dpi_y, 90.0);
    assert_eq!(opts.limits.max_reference_depth, 3);
    assert_eq!(
        opts.limits.max_kernel_cells,
        Limits::default().max_kernel_cells
    );
}

#[test]
fn malformed_json_is_an_error() {
    assert!(Options::from_json_str("{ dpi_x: }").is_err());
}

#[test]
fn surface_guard_rejects_oversized_allocations() {
    let limits = Limits {
        max_surface_pixels: 100,
        ..Limits::default()
    };
    assert!(limits.check_surface(10, 10).is_ok());
    assert!(limits.check_surface(11, 10).is_err());
    assert!(Limits::unlimited().check_surface(u32::MAX, u32::MAX).is_ok());
}
