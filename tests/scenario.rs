//! End-to-end localization and degenerate-input behavior.

use flcc::{flcc, lcc, Complex, CorrelationConfig, Correlator, Method, Shape, Tensor};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn uniform(rng: &mut StdRng, shape: &[usize]) -> Tensor<f64> {
    Tensor::from_fn(shape, |_| rng.random::<f64>()).unwrap()
}

#[test]
fn locates_affine_copy_in_large_image() {
    let mut rng = StdRng::seed_from_u64(1);
    let haystack = uniform(&mut rng, &[1024, 1024]);
    let needle = haystack
        .view()
        .roi(&[42, 45], [6, 5])
        .unwrap()
        .to_tensor()
        .map(|&v| 1.7 * v - 0.4);
    let field = flcc(haystack.view(), needle.view()).unwrap();
    assert_eq!(field.shape(), &Shape::from([1019, 1020]));
    assert_eq!(field.argmax(), Some(vec![42, 45]));
    assert!((field.get(&[42, 45]).unwrap() - 1.0).abs() < 1e-8);
}

#[test]
fn affine_invariance_holds_for_real_and_complex_data() {
    let mut rng = StdRng::seed_from_u64(9);
    let haystack = uniform(&mut rng, &[24, 20, 8]);
    let origin = [10usize, 3, 2];
    let copy = haystack.view().roi(&origin, [4, 6, 3]).unwrap().to_tensor();

    for (a, b) in [
        (1.0, 0.0),
        (0.5, 10.0),
        (250.0, -3.0),
        (-2.0, 7.0),
        (1e-4, 1.0),
        (0.01, 100.0),
        (1.0, 1e4),
    ] {
        let needle = copy.map(|&v| a * v + b);
        for field in [
            lcc(haystack.view(), needle.view()).unwrap(),
            flcc(haystack.view(), needle.view()).unwrap(),
        ] {
            assert_eq!(field.argmax(), Some(origin.to_vec()), "a = {a}, b = {b}");
            assert!((field.get(&origin).unwrap() - 1.0).abs() < 1e-9, "a = {a}, b = {b}");
        }
    }

    let complex_haystack = haystack.map(|&v| Complex::new(v, 1.0 - v * v));
    let complex_copy = complex_haystack
        .view()
        .roi(&origin, [4, 6, 3])
        .unwrap()
        .to_tensor();
    let gain = Complex::from_polar(3.0, 2.1);
    let needle = complex_copy.map(|&z| gain * z + Complex::new(-1.0, 0.5));
    let field = flcc(complex_haystack.view(), needle.view()).unwrap();
    assert_eq!(field.argmax(), Some(origin.to_vec()));
    assert!((field.get(&origin).unwrap() - 1.0).abs() < 1e-9);
}

#[test]
fn large_haystack_offset_keeps_unit_peak() {
    let mut rng = StdRng::seed_from_u64(27);
    let base = uniform(&mut rng, &[40, 36]);
    let haystack = base.map(|&v| v + 1e4);
    let origin = [17usize, 22];
    let needle = base.view().roi(&origin, [5, 7]).unwrap().to_tensor();

    for field in [
        lcc(haystack.view(), needle.view()).unwrap(),
        flcc(haystack.view(), needle.view()).unwrap(),
    ] {
        assert_eq!(field.argmax(), Some(origin.to_vec()));
        assert!((field.get(&origin).unwrap() - 1.0).abs() < 1e-9);
        assert!(field.data().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    let reference = lcc(base.view(), needle.view()).unwrap();
    let lifted = flcc(haystack.view(), needle.view()).unwrap();
    for (a, b) in reference.data().iter().zip(lifted.data()) {
        assert!((a - b).abs() < 1e-6, "{a} vs {b}");
    }
}

#[test]
fn negative_gain_keeps_the_peak() {
    let mut rng = StdRng::seed_from_u64(13);
    let haystack = uniform(&mut rng, &[200]);
    let needle = haystack
        .view()
        .roi(&[60], [11])
        .unwrap()
        .to_tensor()
        .map(|&v| -4.0 * v + 1.0);
    let field = flcc(haystack.view(), needle.view()).unwrap();
    assert_eq!(field.argmax(), Some(vec![60]));
    assert!((field.data()[60] - 1.0).abs() < 1e-9);
}

#[test]
fn constant_needle_yields_zero_field() {
    let mut rng = StdRng::seed_from_u64(17);
    let haystack = uniform(&mut rng, &[30, 25]);
    let needle = Tensor::filled([4, 4], 0.3).unwrap();
    for field in [
        lcc(haystack.view(), needle.view()).unwrap(),
        flcc(haystack.view(), needle.view()).unwrap(),
    ] {
        assert_eq!(field.shape(), &Shape::from([27, 22]));
        assert!(field.data().iter().all(|&v| v == 0.0));
    }
}

#[test]
fn flat_haystack_region_scores_zero_without_nan() {
    let mut rng = StdRng::seed_from_u64(21);
    let mut data = uniform(&mut rng, &[40, 40]).into_data();
    for row in 0..20 {
        for col in 0..20 {
            data[row * 40 + col] = 5.0;
        }
    }
    let haystack = Tensor::new(data, [40, 40]).unwrap();
    let needle = uniform(&mut rng, &[5, 5]);

    let slow = lcc(haystack.view(), needle.view()).unwrap();
    let fast = flcc(haystack.view(), needle.view()).unwrap();
    for field in [&slow, &fast] {
        assert!(field.data().iter().all(|v| v.is_finite()));
        for row in 0..16 {
            for col in 0..16 {
                assert_eq!(*field.get(&[row, col]).unwrap(), 0.0);
            }
        }
    }
}

#[test]
fn correlator_reports_separated_matches() {
    let mut rng = StdRng::seed_from_u64(31);
    let mut data = uniform(&mut rng, &[64, 64]).into_data();
    let pattern: Vec<f64> = (0..36).map(|_| rng.random::<f64>()).collect();
    for (r0, c0, gain) in [(5usize, 7usize, 1.0), (40, 30, 2.5)] {
        for r in 0..6 {
            for c in 0..6 {
                data[(r0 + r) * 64 + c0 + c] = gain * pattern[r * 6 + c];
            }
        }
    }
    let haystack = Tensor::new(data, [64, 64]).unwrap();
    let needle = Tensor::new(pattern, [6, 6]).unwrap();

    let correlator = Correlator::new().with_config(CorrelationConfig {
        method: Method::Fft,
        ..CorrelationConfig::default()
    });
    let matches = correlator
        .top_matches(haystack.view(), needle.view(), 2, 3)
        .unwrap();
    let mut found: Vec<Vec<usize>> = matches.iter().map(|m| m.index.clone()).collect();
    found.sort();
    assert_eq!(found, vec![vec![5, 7], vec![40, 30]]);
    assert!(matches.iter().all(|m| (m.score - 1.0).abs() < 1e-9));
}
