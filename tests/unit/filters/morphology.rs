use super::*;

const WHITE: [u8; 4] = [255, 255, 255, 255];

fn square() -> Surface {
    let mut s = Surface::new(9, 9).unwrap();
    for y in 2..7 {
        for x in 2..7 {
            s.set_pixel(x, y, WHITE);
        }
    }
    s
}

#[test]
fn zero_radius_is_passthrough() {
    let s = square();
    let out = apply(s.clone(), MorphologyOp::Erode, 0.0, 2.0, s.bounds(), &Limits::default()).unwrap();
    assert_eq!(out, s);
}

#[test]
fn erode_shrinks_and_dilate_grows() {
    let s = square();
    let eroded = apply(s.clone(), MorphologyOp::Erode, 1.0, 1.0, s.bounds(), &Limits::default()).unwrap();
    assert_eq!(eroded.pixel(2, 4), [0; 4]);
    assert_eq!(eroded.pixel(4, 4), WHITE);

    let dilated = apply(s.clone(), MorphologyOp::Dilate, 1.0, 1.0, s.bounds(), &Limits::default()).unwrap();
    assert_eq!(dilated.pixel(1, 4), WHITE);
    assert_eq!(dilated.pixel(0, 4), [0; 4]);
}

#[test]
fn neighbourhood_is_elliptical() {
    let mut s = Surface::new(7, 7).unwrap();
    s.set_pixel(3, 3, WHITE);
    let out = apply(s.clone(), MorphologyOp::Dilate, 2.0, 2.0, s.bounds(), &Limits::default()).unwrap();
    assert_eq!(out.pixel(5, 3), WHITE);
    assert_eq!(out.pixel(4, 4), WHITE);
    // (2, 2) lies outside the radius-2 circle.
    assert_eq!(out.pixel(5, 5), [0; 4]);
}

#[test]
fn parse_operator() {
    assert_eq!(MorphologyOp::parse("dilate"), Some(MorphologyOp::Dilate));
    assert_eq!(MorphologyOp::parse("open"), None);
}

/// Straight per-offset reduction over the same ellipse.
fn naive(input: &Surface, op: MorphologyOp, rx: i32, ry: i32, bounds: IRect) -> Surface {
    let mut out = Surface::new(input.width(), input.height()).unwrap();
    for y in bounds.y0..bounds.y1 {
        for x in bounds.x0..bounds.x1 {
            let mut acc = op.identity();
            for dy in -ry..=ry {
                for dx in -rx..=rx {
                    let (nx, ny) = (f64::from(dx) / f64::from(rx), f64::from(dy) / f64::from(ry));
                    if nx * nx + ny * ny > 1.0 {
                        continue;
                    }
                    let (sx, sy) = (x + dx, y + dy);
                    let px = if bounds.contains(sx, sy) {
                        input.pixel(sx, sy)
                    } else {
                        [0; 4]
                    };
                    acc = op.combine(acc, px);
                }
            }
            out.set_pixel(x, y, acc);
        }
    }
    out
}

fn noise(w: u32, h: u32) -> Surface {
    let mut s = Surface::new(w, h).unwrap();
    let mut seed = 7u32;
    for y in 0..h as i32 {
        for x in 0..w as i32 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let a = (seed >> 16) as u8;
            s.set_pixel(x, y, [a / 2, a / 3, a / 4, a]);
        }
    }
    s
}

#[test]
fn sliding_window_matches_direct_reduction() {
    let s = noise(23, 17);
    let bounds = IRect::new(2, 1, 21, 16);
    for op in [MorphologyOp::Erode, MorphologyOp::Dilate] {
        for (rx, ry) in [(1, 1), (3, 2), (2, 5), (9, 1), (30, 30)] {
            let fast = apply(s.clone(), op, f64::from(rx), f64::from(ry), bounds, &Limits::default())
                .unwrap();
            assert_eq!(fast, naive(&s, op, rx, ry, bounds), "{op:?} {rx}x{ry}");
        }
    }
}

#[test]
fn large_radius_over_a_large_region_finishes() {
    let mut s = Surface::new(200, 200).unwrap();
    s.set_pixel(10, 10, WHITE);
    let out = apply(s.clone(), MorphologyOp::Dilate, 150.0, 150.0, s.bounds(), &Limits::default())
        .unwrap();
    assert_eq!(out.pixel(159, 10), WHITE);
    assert_eq!(out.pixel(10, 159), WHITE);
    assert_eq!(out.pixel(199, 199), [0; 4]);
}

#[test]
fn work_budget_is_a_limit_error() {
    let s = square();
    let limits = Limits {
        max_filter_work: 9 * 9 * 3 - 1,
        ..Limits::default()
    };
    let err = apply(s.clone(), MorphologyOp::Erode, 4.0, 1.0, s.bounds(), &limits).unwrap_err();
    assert!(matches!(err, SvgraphError::Limit(_)));
    assert!(err.is_recoverable());
    // Cost follows the vertical radius only.
    let ok = Limits {
        max_filter_work: 9 * 9 * 3,
        ..Limits::default()
    };
    assert!(apply(s.clone(), MorphologyOp::Erode, 4.0, 1.0, s.bounds(), &ok).is_ok());
}
