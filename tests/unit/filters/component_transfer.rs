use super::*;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn table_interpolates_between_entries() {
    let f = TransferFn::Table(vec![0.0, 1.0, 0.0]);
    assert!(close(f.eval(0.0), 0.0));
    assert!(close(f.eval(0.25), 0.5));
    assert!(close(f.eval(0.5), 1.0));
    assert!(close(f.eval(1.0), 0.0));
}

#[test]
fn discrete_steps() {
    let f = TransferFn::Discrete(vec![0.2, 0.8]);
    assert!(close(f.eval(0.1), 0.2));
    assert!(close(f.eval(0.6), 0.8));
    assert!(close(f.eval(1.0), 0.8));
}

#[test]
fn empty_table_is_identity() {
    assert!(close(TransferFn::Table(vec![]).eval(0.3), 0.3));
    assert!(close(TransferFn::Discrete(vec![]).eval(0.3), 0.3));
}

#[test]
fn linear_and_gamma() {
    let lin = TransferFn::Linear {
        slope: 0.5,
        intercept: 0.25,
    };
    assert!(close(lin.eval(1.0), 0.75));
    let gamma = TransferFn::Gamma {
        amplitude: 2.0,
        exponent: 2.0,
        offset: 0.1,
    };
    assert!(close(gamma.eval(0.5), 0.6));
}

#[test]
fn inverting_red_channel() {
    let funcs = [
        TransferFn::Table(vec![1.0, 0.0]),
        TransferFn::Identity,
        TransferFn::Identity,
        TransferFn::Identity,
    ];
    let mut s = Surface::new(1, 1).unwrap();
    s.fill([0, 0, 255, 255]);
    let out = apply(s, &funcs, IRect::new(0, 0, 1, 1)).unwrap();
    assert_eq!(out.pixel(0, 0), [255, 0, 255, 255]);
}
