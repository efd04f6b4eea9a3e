use super::*;

fn params(kind: TurbulenceKind) -> TurbulenceParams {
    TurbulenceParams {
        base_frequency: (0.05, 0.05),
        octaves: 2,
        seed: 0.0,
        stitch_tiles: false,
        kind,
    }
}

#[test]
fn seed_setup_matches_reference_generator() {
    assert_eq!(setup_seed(0), 1);
    assert_eq!(setup_seed(-5), 6);
    assert_eq!(random(1), 16_807);
    assert_eq!(random(16_807), 282_475_249);
}

#[test]
fn noise_is_deterministic_for_a_seed() {
    let a = NoiseGenerator::new(3.0);
    let b = NoiseGenerator::new(3.0);
    let p = Point::new(12.3, 45.6);
    let pr = params(TurbulenceKind::FractalNoise);
    for ch in 0..4 {
        assert_eq!(a.turbulence(ch, p, &pr, None), b.turbulence(ch, p, &pr, None));
    }
}

#[test]
fn noise_vanishes_on_lattice_points() {
    let g = NoiseGenerator::new(7.0);
    for ch in 0..4 {
        assert_eq!(g.noise2(ch, 3.0, 5.0, None), 0.0);
    }
}

#[test]
fn different_seeds_differ() {
    let a = NoiseGenerator::new(1.0);
    let b = NoiseGenerator::new(2.0);
    let p = Point::new(10.5, 20.25);
    let pr = params(TurbulenceKind::Turbulence);
    let differs = (0..4).any(|ch| a.turbulence(ch, p, &pr, None) != b.turbulence(ch, p, &pr, None));
    assert!(differs);
}

#[test]
fn turbulence_sum_is_non_negative() {
    let g = NoiseGenerator::new(0.0);
    let pr = params(TurbulenceKind::Turbulence);
    for i in 0..20 {
        let p = Point::new(f64::from(i) * 3.7, f64::from(i) * 1.3);
        assert!(g.turbulence(0, p, &pr, None) >= 0.0);
    }
}

#[test]
fn stitching_snaps_frequency_to_tile() {
    assert!((stitch_frequency(0.13, 100.0) - 0.13).abs() < 1e-12);
    let f = stitch_frequency(0.0125, 100.0);
    assert!((f * 100.0 - (f * 100.0).round()).abs() < 1e-12);
}
