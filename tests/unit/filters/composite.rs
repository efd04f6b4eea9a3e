use super::*;

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const CLEAR: [u8; 4] = [0, 0, 0, 0];

#[test]
fn porter_duff_table() {
    assert_eq!(composite_pixel(RED, BLUE, CompositeOperator::Over), RED);
    assert_eq!(composite_pixel(CLEAR, BLUE, CompositeOperator::Over), BLUE);
    assert_eq!(composite_pixel(RED, BLUE, CompositeOperator::In), RED);
    assert_eq!(composite_pixel(RED, CLEAR, CompositeOperator::In), CLEAR);
    assert_eq!(composite_pixel(RED, BLUE, CompositeOperator::Out), CLEAR);
    assert_eq!(composite_pixel(RED, CLEAR, CompositeOperator::Out), RED);
    assert_eq!(composite_pixel(RED, BLUE, CompositeOperator::Atop), RED);
    assert_eq!(composite_pixel(RED, CLEAR, CompositeOperator::Atop), CLEAR);
    assert_eq!(composite_pixel(RED, BLUE, CompositeOperator::Xor), CLEAR);
    assert_eq!(composite_pixel(RED, CLEAR, CompositeOperator::Xor), RED);
}

#[test]
fn arithmetic_adds_and_clamps() {
    let add = CompositeOperator::Arithmetic {
        k1: 0.0,
        k2: 1.0,
        k3: 1.0,
        k4: 0.0,
    };
    assert_eq!(composite_pixel(RED, BLUE, add), [255, 0, 255, 255]);

    let k4_only = CompositeOperator::Arithmetic {
        k1: 0.0,
        k2: 0.0,
        k3: 0.0,
        k4: 0.5,
    };
    assert_eq!(composite_pixel(CLEAR, CLEAR, k4_only), [128, 128, 128, 128]);
}

#[test]
fn arithmetic_keeps_color_at_most_alpha() {
    let op = CompositeOperator::Arithmetic {
        k1: 0.0,
        k2: 2.0,
        k3: 0.0,
        k4: 0.0,
    };
    let half = [100, 0, 0, 100];
    let out = composite_pixel(half, CLEAR, op);
    assert!(out[0] <= out[3]);
}

#[test]
fn merge_non_overlapping_is_union() {
    let mut a = Surface::new(2, 1).unwrap();
    a.set_pixel(0, 0, RED);
    let mut b = Surface::new(2, 1).unwrap();
    b.set_pixel(1, 0, BLUE);
    let base = Surface::new(2, 1).unwrap();
    let out = merge(base, &[a, b], IRect::new(0, 0, 2, 1)).unwrap();
    assert_eq!(out.pixel(0, 0), RED);
    assert_eq!(out.pixel(1, 0), BLUE);
}

#[test]
fn merge_overlapping_opaque_is_last() {
    let mut a = Surface::new(1, 1).unwrap();
    a.fill(RED);
    let mut b = Surface::new(1, 1).unwrap();
    b.fill(BLUE);
    let out = merge(Surface::new(1, 1).unwrap(), &[a, b], IRect::new(0, 0, 1, 1)).unwrap();
    assert_eq!(out.pixel(0, 0), BLUE);
}
