//! Direct and FFT evaluation must agree on random inputs of every rank.

use flcc::{flcc, lcc, window_sums, BoxSumMode, Complex, Shape, Tensor};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const TOLERANCE: f64 = 1e-6;

fn random_real(rng: &mut StdRng, shape: &[usize]) -> Tensor<f64> {
    Tensor::from_fn(shape, |_| rng.random_range(-1.0..1.0)).unwrap()
}

fn random_complex(rng: &mut StdRng, shape: &[usize]) -> Tensor<Complex<f64>> {
    Tensor::from_fn(shape, |_| {
        Complex::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0))
    })
    .unwrap()
}

fn assert_fields_close(slow: &Tensor<f64>, fast: &Tensor<f64>) {
    assert_eq!(slow.shape(), fast.shape());
    for (i, (a, b)) in slow.data().iter().zip(fast.data()).enumerate() {
        assert!(a.is_finite() && b.is_finite(), "non-finite value at {i}");
        assert!((a - b).abs() < TOLERANCE, "mismatch at {i}: {a} vs {b}");
    }
}

const CASES: [(&[usize], &[usize]); 5] = [
    (&[200], &[9]),
    (&[1], &[1]),
    (&[37, 29], &[5, 8]),
    (&[16, 16], &[16, 16]),
    (&[12, 10, 9], &[3, 4, 2]),
];

#[test]
fn real_lcc_matches_flcc() {
    let mut rng = StdRng::seed_from_u64(7);
    for (haystack_shape, needle_shape) in CASES {
        let haystack = random_real(&mut rng, haystack_shape);
        let needle = random_real(&mut rng, needle_shape);
        let slow = lcc(haystack.view(), needle.view()).unwrap();
        let fast = flcc(haystack.view(), needle.view()).unwrap();
        assert_fields_close(&slow, &fast);
        for &value in slow.data().iter().chain(fast.data()) {
            assert!((0.0..=1.0).contains(&value));
        }
    }
}

#[test]
fn complex_lcc_matches_flcc() {
    let mut rng = StdRng::seed_from_u64(11);
    for (haystack_shape, needle_shape) in CASES {
        let haystack = random_complex(&mut rng, haystack_shape);
        let needle = random_complex(&mut rng, needle_shape);
        let slow = lcc(haystack.view(), needle.view()).unwrap();
        let fast = flcc(haystack.view(), needle.view()).unwrap();
        assert_fields_close(&slow, &fast);
        for &value in slow.data().iter().chain(fast.data()) {
            assert!((0.0..=1.0).contains(&value));
        }
    }
}

#[test]
fn exact_copies_never_exceed_one() {
    let mut rng = StdRng::seed_from_u64(29);
    let haystack = random_complex(&mut rng, &[33, 18]);
    for origin in [[0usize, 0], [12, 5], [29, 14]] {
        let needle = haystack.view().roi(&origin, [4, 4]).unwrap().to_tensor();
        let slow = lcc(haystack.view(), needle.view()).unwrap();
        let fast = flcc(haystack.view(), needle.view()).unwrap();
        for field in [&slow, &fast] {
            assert!(*field.get(&origin).unwrap() <= 1.0);
            assert!((field.get(&origin).unwrap() - 1.0).abs() < 1e-9);
            assert_eq!(field.max().map(|m| m <= 1.0), Some(true));
        }
    }
}

#[test]
fn single_precision_stays_close_to_double() {
    let mut rng = StdRng::seed_from_u64(3);
    let haystack = random_real(&mut rng, &[48, 40]);
    let needle = random_real(&mut rng, &[6, 7]);
    let reference = flcc(haystack.view(), needle.view()).unwrap();

    let haystack32 = haystack.map(|&v| v as f32);
    let needle32 = needle.map(|&v| v as f32);
    let fast32 = flcc(haystack32.view(), needle32.view()).unwrap();
    let slow32 = lcc(haystack32.view(), needle32.view()).unwrap();
    for ((a, b), r) in fast32.data().iter().zip(slow32.data()).zip(reference.data()) {
        assert!((a - b).abs() < 1e-3);
        assert!((f64::from(*a) - r).abs() < 1e-3);
    }
}

#[test]
fn box_sum_modes_agree_on_random_input() {
    let mut rng = StdRng::seed_from_u64(19);
    let tensor = random_complex(&mut rng, &[21, 17, 5]);
    let window = Shape::from([4, 6, 3]);
    let direct = window_sums(tensor.view(), &window, BoxSumMode::Direct).unwrap();
    let fft = window_sums(tensor.view(), &window, BoxSumMode::Fft).unwrap();
    assert_eq!(direct.shape(), &Shape::from([18, 12, 3]));
    for (a, b) in direct.sums().data().iter().zip(fft.sums().data()) {
        assert!((a - b).norm() < 1e-9);
    }
    for (a, b) in direct.sums_sq().data().iter().zip(fft.sums_sq().data()) {
        assert!((a - b).abs() < 1e-9);
    }
}

#[test]
fn strided_views_match_owned_copies() {
    let mut rng = StdRng::seed_from_u64(23);
    let parent = random_real(&mut rng, &[30, 30]);
    let haystack = parent.view().roi(&[3, 5], [20, 18]).unwrap();
    let needle = parent.view().roi(&[10, 12], [4, 5]).unwrap();
    let from_views = flcc(haystack.clone(), needle.clone()).unwrap();
    let from_owned = lcc(haystack.to_tensor().view(), needle.to_tensor().view()).unwrap();
    assert_fields_close(&from_owned, &from_views);
    assert_eq!(from_views.argmax(), Some(vec![7, 7]));
}
