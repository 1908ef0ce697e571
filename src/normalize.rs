//! Local normalization of raw cross-correlation terms.
//!
//! The needle is centered before correlation: with `M` elements per window,
//! needle mean `mu` and the raw term `c = sum(window * conj(needle - mu))`,
//! the coefficient at a placement is
//!
//! ```text
//! |c| / sqrt(M^2 * var(window) * var(needle))
//! ```
//!
//! Centering the needle makes `c` independent of the window mean, so no
//! large terms cancel in the numerator. Window variances come from box sums of
//! the haystack after its global mean is subtracted, which changes no
//! coefficient but keeps the one-pass variance well conditioned.
//!
//! Variances use squared magnitudes, so complex data yields a real,
//! non-negative denominator. Flat placements (or every placement, for a flat
//! needle) score exactly `0` instead of dividing by zero; see
//! [`NeedleStats::is_degenerate`] and [`correlate`] for the thresholds.

use crate::boxsum::WindowSums;
use crate::scalar::{Element, Real};
use crate::tensor::{Tensor, TensorView};
use crate::trace::trace_event;
use crate::util::{FlccError, FlccResult};
use num_traits::{Float, One, Zero};

/// Mean and centered variance of a needle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NeedleStats<T: Element> {
    count: usize,
    mean: T,
    mean_square: T::Real,
    variance: T::Real,
}

impl<T: Element> NeedleStats<T> {
    /// Computes statistics over every element of `needle` in two passes.
    pub fn from_view(needle: &TensorView<'_, T>) -> Self {
        let mean = mean_of(needle);
        let mut count = 0usize;
        let mut sum_sq = T::Real::zero();
        let mut centered_sq = T::Real::zero();
        needle.for_each(|&value| {
            count += 1;
            sum_sq += value.norm_sqr();
            centered_sq += (value - mean).norm_sqr();
        });
        let n = T::Real::from_count(count.max(1));
        Self {
            count,
            mean,
            mean_square: sum_sq / n,
            variance: centered_sq / n,
        }
    }

    /// Number of needle elements.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Needle mean.
    pub fn mean(&self) -> T {
        self.mean
    }

    /// Mean of squared magnitudes.
    pub fn mean_square(&self) -> T::Real {
        self.mean_square
    }

    /// Centered needle variance (magnitude-based for complex data).
    pub fn variance(&self) -> T::Real {
        self.variance
    }

    /// Returns the needle value with its mean removed.
    #[inline]
    pub fn center(&self, value: T) -> T {
        value - self.mean
    }

    /// Returns true if the needle is flat under `tolerance`.
    ///
    /// Two-pass centering leaves residuals of order `epsilon * |mean|`, so the
    /// needle counts as flat when its variance is at most
    /// `tolerance^2 * mean_square`.
    pub fn is_degenerate(&self, tolerance: T::Real) -> bool {
        is_flat(self.variance, tolerance * tolerance * self.mean_square)
    }
}

/// Mean of every element of `view`; zero for an empty view.
pub(crate) fn mean_of<T: Element>(view: &TensorView<'_, T>) -> T {
    let mut count = 0usize;
    let mut sum = T::zero();
    view.for_each(|&value| {
        count += 1;
        sum += value;
    });
    sum.scale(T::Real::from_count(count.max(1)).recip())
}

/// Turns raw correlation terms into local correlation coefficients.
///
/// `cross` holds `sum(window * conj(needle - mu))` for every placement in the
/// row-major order of `window.shape()`, and `window` the box sums of the same
/// haystack (shifted by any constant). A window counts as flat when its
/// variance is at most `tolerance` times its mean square. Coefficients are
/// clamped to `[0, 1]`.
pub fn correlate<T: Element>(
    cross: &[T],
    window: &WindowSums<T>,
    needle: &NeedleStats<T>,
    tolerance: T::Real,
) -> FlccResult<Tensor<T::Real>> {
    let shape = window.shape().clone();
    if cross.len() != shape.len() {
        return Err(FlccError::LengthMismatch {
            shape: shape.dims().to_vec(),
            needed: shape.len(),
            got: cross.len(),
        });
    }
    if window.count() != needle.count() {
        return Err(FlccError::ShapeMismatch {
            reason: "needle element count differs from the window element count",
            expected: vec![window.count()],
            got: vec![needle.count()],
        });
    }
    let zero = T::Real::zero();
    let one = T::Real::one();

    if needle.is_degenerate(tolerance) {
        trace_event!("degenerate_needle", positions = cross.len());
        return Ok(Tensor::from_raw(vec![zero; cross.len()], shape));
    }

    let n = T::Real::from_count(window.count());
    let inv_n = n.recip();
    let needle_var = needle.variance();

    let mut flat = 0usize;
    let data = cross
        .iter()
        .zip(window.sums().data())
        .zip(window.sums_sq().data())
        .map(|((&c, &sum), &sum_sq)| {
            let w_ms = sum_sq * inv_n;
            let w_var = w_ms - sum.scale(inv_n).norm_sqr();
            if is_flat(w_var, tolerance * w_ms) {
                flat += 1;
                return zero;
            }
            let denominator = n * (w_var * needle_var).sqrt();
            (c.coefficient() / denominator).min(one)
        })
        .collect();

    trace_event!("normalized", positions = cross.len(), flat_windows = flat);
    Ok(Tensor::from_raw(data, shape))
}

#[inline]
fn is_flat<R: Real>(variance: R, threshold: R) -> bool {
    // Negated comparison so a NaN variance also counts as flat.
    !(variance > threshold)
}
