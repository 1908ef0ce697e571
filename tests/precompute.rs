//! A prepared session must reproduce one-shot results for every needle.

use flcc::{flcc, flcc_complete, flcc_prepare, Complex, FlccError, Shape, Tensor};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn session_matches_one_shot_for_several_needles() {
    let mut rng = StdRng::seed_from_u64(42);
    let haystack = Tensor::from_fn([40, 33, 6], |_| rng.random_range(-2.0f64..2.0)).unwrap();
    let window = Shape::from([5, 4, 3]);
    let session = flcc_prepare(haystack.view(), &window).unwrap();
    assert_eq!(session.window_shape(), &window);
    assert_eq!(session.valid_shape(), &Shape::from([36, 30, 4]));

    for _ in 0..4 {
        let needle = Tensor::from_fn(&window, |_| rng.random_range(-1.0..1.0)).unwrap();
        let amortized = flcc_complete(&session, needle.view()).unwrap();
        let one_shot = flcc(haystack.view(), needle.view()).unwrap();
        assert_eq!(amortized.shape(), one_shot.shape());
        for (a, b) in amortized.data().iter().zip(one_shot.data()) {
            assert!((a - b).abs() < 1e-12, "{a} vs {b}");
        }
    }
}

#[test]
fn session_serves_needles_from_several_threads() {
    let mut rng = StdRng::seed_from_u64(5);
    let haystack = Tensor::from_fn([300], |_| {
        Complex::new(rng.random_range(-1.0f64..1.0), rng.random_range(-1.0..1.0))
    })
    .unwrap();
    let session = flcc_prepare(haystack.view(), &Shape::from([12])).unwrap();
    let offsets = [0usize, 77, 150, 288];

    std::thread::scope(|scope| {
        for &offset in &offsets {
            let session = &session;
            let haystack = &haystack;
            scope.spawn(move || {
                let needle = haystack
                    .view()
                    .roi(&[offset], [12])
                    .unwrap()
                    .to_tensor()
                    .map(|&z| z * Complex::new(-0.5, 2.0));
                let field = session.complete(needle.view()).unwrap();
                assert_eq!(field.argmax(), Some(vec![offset]));
                assert!((field.data()[offset] - 1.0).abs() < 1e-9);
            });
        }
    });
}

#[test]
fn session_rejects_needle_of_another_shape() {
    let haystack = Tensor::from_fn([20, 20], |i| (i[0] as f64).sin() + (i[1] as f64).cos()).unwrap();
    let session = flcc_prepare(haystack.view(), &Shape::from([4, 5])).unwrap();
    let needle = Tensor::filled([5, 4], 1.0).unwrap();
    let err = flcc_complete(&session, needle.view()).unwrap_err();
    assert_eq!(
        err,
        FlccError::ShapeMismatch {
            reason: "needle shape differs from the session window shape",
            expected: vec![4, 5],
            got: vec![5, 4],
        }
    );
}

#[test]
fn long_signal_session_finds_needles_at_both_ends() {
    const LEN: usize = 1 << 20;
    const NEEDLE: usize = 7;

    let mut rng = StdRng::seed_from_u64(2024);
    let haystack = Tensor::from_fn([LEN], |_| rng.random::<f64>()).unwrap();
    let session = flcc_prepare(haystack.view(), &Shape::from([NEEDLE])).unwrap();
    assert_eq!(session.valid_shape(), &Shape::from([LEN - NEEDLE + 1]));

    for (offset, gain) in [(1usize, 2.0), (41, 0.5), (LEN - NEEDLE, 3.0)] {
        let needle = haystack
            .view()
            .roi(&[offset], [NEEDLE])
            .unwrap()
            .to_tensor()
            .map(|&v| gain * v + 0.25);
        let field = flcc_complete(&session, needle.view()).unwrap();
        assert_eq!(field.argmax(), Some(vec![offset]));
        assert!((field.data()[offset] - 1.0).abs() < 1e-8);
    }
}
