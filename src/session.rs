//! Precomputed haystack state for repeated needle queries.
//!
//! Preparing a session performs every haystack-only step once: padding, the
//! haystack transform, the box-kernel transform and the window sums. The
//! haystack is shifted by its global mean before any of these, so cached
//! sums describe the shifted data. Each
//! [`FlccSession::complete`] call then transforms only the needle. The session
//! is immutable after construction; `complete` takes `&self` and allocates its
//! own buffers, so one session can serve many threads at once.

use crate::boxsum::{spectral_window_sums, WindowSums};
use crate::fft::{conjugate_in_place, multiply_in_place, FftNd};
use crate::kernel::{check_tolerance, validate_pair};
use crate::normalize::{correlate, mean_of, NeedleStats};
use crate::scalar::{Element, Real};
use crate::tensor::{Shape, Tensor, TensorView};
use crate::trace::{trace_event, trace_span};
use crate::util::{FlccError, FlccResult};
use num_complex::Complex;

/// Haystack-dependent FFT data for one fixed window shape.
pub struct FlccSession<T: Element> {
    haystack: Tensor<T>,
    haystack_mean: T,
    window: Shape,
    valid: Shape,
    fft: FftNd<T::Real>,
    haystack_spectrum: Vec<Complex<T::Real>>,
    kernel_spectrum: Vec<Complex<T::Real>>,
    sums: WindowSums<T>,
    tolerance: T::Real,
}

impl<T: Element> FlccSession<T> {
    /// Prepares a session for needles of shape `window`.
    pub fn prepare(haystack: TensorView<'_, T>, window: &Shape) -> FlccResult<Self> {
        Self::prepare_with_tolerance(haystack, window, T::Real::default_variance_tolerance())
    }

    /// [`FlccSession::prepare`] with an explicit relative variance tolerance.
    pub fn prepare_with_tolerance(
        haystack: TensorView<'_, T>,
        window: &Shape,
        tolerance: T::Real,
    ) -> FlccResult<Self> {
        let valid = validate_pair(haystack.shape(), window)?;
        check_tolerance(tolerance)?;
        let _span = trace_span!(
            "flcc_prepare",
            rank = window.rank(),
            haystack_len = haystack.shape().len(),
            window_len = window.len()
        )
        .entered();

        let haystack_mean = mean_of(&haystack);
        let fft = FftNd::for_correlation(haystack.shape(), window);
        let mut haystack_spectrum =
            fft.pad_with(&haystack, |value: T| (value - haystack_mean).to_complex());
        fft.forward(&mut haystack_spectrum);

        let kernel_spectrum = fft.box_spectrum(window);
        let mut kernel_conj = kernel_spectrum.clone();
        conjugate_in_place(&mut kernel_conj);
        let sums = spectral_window_sums(
            &fft,
            &haystack_spectrum,
            &kernel_conj,
            &haystack,
            haystack_mean,
            window.len(),
            &valid,
        );

        trace_event!(
            "flcc_prepared",
            padded_len = fft.shape().len(),
            positions = valid.len()
        );
        Ok(Self {
            haystack: haystack.to_tensor(),
            haystack_mean,
            window: window.clone(),
            valid,
            fft,
            haystack_spectrum,
            kernel_spectrum,
            sums,
            tolerance,
        })
    }

    /// Computes the correlation field for one needle of the session's shape.
    ///
    /// Fails with [`FlccError::ShapeMismatch`] before any transform work if
    /// the needle shape differs from the window shape.
    pub fn complete(&self, needle: TensorView<'_, T>) -> FlccResult<Tensor<T::Real>> {
        if needle.shape() != &self.window {
            return Err(FlccError::ShapeMismatch {
                reason: "needle shape differs from the session window shape",
                expected: self.window.dims().to_vec(),
                got: needle.shape().dims().to_vec(),
            });
        }
        let _span = trace_span!("flcc_complete", window_len = self.window.len()).entered();

        // IFFT(H * conj(N)) at p is sum_k h[p + k] * conj(n[k] - mu).
        let stats = NeedleStats::from_view(&needle);
        let mut product = self
            .fft
            .pad_with(&needle, |value: T| stats.center(value).to_complex());
        self.fft.forward(&mut product);
        conjugate_in_place(&mut product);
        multiply_in_place(&mut product, &self.haystack_spectrum);
        self.fft.inverse(&mut product);
        let cross: Vec<T> = self.fft.crop(&product, &self.valid);
        correlate(&cross, &self.sums, &stats, self.tolerance)
    }

    /// Fixed needle shape.
    pub fn window_shape(&self) -> &Shape {
        &self.window
    }

    /// Shape of the haystack the session was prepared from.
    pub fn haystack_shape(&self) -> &Shape {
        self.haystack.shape()
    }

    /// Shape of every correlation field this session produces.
    pub fn valid_shape(&self) -> &Shape {
        &self.valid
    }

    /// Zero-padded transform shape.
    pub fn padded_shape(&self) -> &Shape {
        self.fft.shape()
    }

    /// Number of elements in one window.
    pub fn window_count(&self) -> usize {
        self.sums.count()
    }

    /// Relative variance tolerance used for flat windows.
    pub fn tolerance(&self) -> T::Real {
        self.tolerance
    }

    /// Owned copy of the haystack.
    pub fn haystack(&self) -> &Tensor<T> {
        &self.haystack
    }

    /// Global haystack mean subtracted before transforming.
    pub fn haystack_mean(&self) -> T {
        self.haystack_mean
    }

    /// Cached window sums and sums of squares of the mean-shifted haystack.
    pub fn window_sums(&self) -> &WindowSums<T> {
        &self.sums
    }

    /// Forward transform of the zero-padded, mean-shifted haystack (row-major,
    /// padded shape).
    pub fn haystack_spectrum(&self) -> &[Complex<T::Real>] {
        &self.haystack_spectrum
    }

    /// Forward transform of the unit box kernel of the window shape.
    pub fn kernel_spectrum(&self) -> &[Complex<T::Real>] {
        &self.kernel_spectrum
    }
}

/// Prepares a precomputed session; see [`FlccSession::prepare`].
pub fn flcc_prepare<T: Element>(
    haystack: TensorView<'_, T>,
    window: &Shape,
) -> FlccResult<FlccSession<T>> {
    FlccSession::prepare(haystack, window)
}

/// Completes a session with one needle; see [`FlccSession::complete`].
pub fn flcc_complete<T: Element>(
    session: &FlccSession<T>,
    needle: TensorView<'_, T>,
) -> FlccResult<Tensor<T::Real>> {
    session.complete(needle)
}
