//! Direct (brute-force) local correlation coefficients.
//!
//! The raw term at each placement is an explicit inner product of the haystack
//! window with the conjugated, mean-removed needle, O(N·M) overall. The
//! haystack is shifted by its global mean first and window sums come from the
//! direct box-sum engine over the shifted copy. This is the reference the FFT
//! path is checked against, and it wins for small needles where transform
//! overhead dominates.

use crate::boxsum::{window_sums, BoxSumMode};
use crate::kernel::{check_tolerance, validate_pair};
use crate::normalize::{correlate, mean_of, NeedleStats};
use crate::scalar::{Element, Real};
use crate::tensor::index::{for_each_index, offset_of};
use crate::tensor::{Tensor, TensorView};
use crate::trace::{trace_event, trace_span};
use crate::util::{FlccError, FlccResult};

/// Computes local correlation coefficients directly.
///
/// The output has shape `haystack - needle + 1` per axis. Uses the default
/// variance tolerance of the element's real type.
pub fn lcc<T: Element>(
    haystack: TensorView<'_, T>,
    needle: TensorView<'_, T>,
) -> FlccResult<Tensor<T::Real>> {
    lcc_with_tolerance(haystack, needle, T::Real::default_variance_tolerance())
}

/// [`lcc`] with an explicit relative variance tolerance.
pub fn lcc_with_tolerance<T: Element>(
    haystack: TensorView<'_, T>,
    needle: TensorView<'_, T>,
    tolerance: T::Real,
) -> FlccResult<Tensor<T::Real>> {
    let valid = validate_pair(haystack.shape(), needle.shape())?;
    check_tolerance(tolerance)?;
    let _span = trace_span!(
        "lcc",
        rank = valid.rank(),
        haystack_len = haystack.shape().len(),
        needle_len = needle.shape().len()
    )
    .entered();

    let shifted = centered_haystack(&haystack);
    let shifted = shifted.view();
    let stats = NeedleStats::from_view(&needle);
    let plan = CrossPlan::new(&shifted, &needle, &stats);
    let mut cross = Vec::with_capacity(valid.len());
    let data = shifted.as_slice();
    let strides = shifted.strides();
    for_each_index(valid.dims(), |idx| {
        cross.push(plan.dot(data, offset_of(idx, strides)));
    });

    let sums = window_sums(shifted, needle.shape(), BoxSumMode::Direct)?;
    trace_event!("lcc_cross_terms", positions = cross.len());
    correlate(&cross, &sums, &stats, tolerance)
}

/// Local correlation coefficient of the single placement at `position`.
pub fn lcc_at<T: Element>(
    haystack: TensorView<'_, T>,
    needle: TensorView<'_, T>,
    position: &[usize],
    tolerance: T::Real,
) -> FlccResult<T::Real> {
    validate_pair(haystack.shape(), needle.shape())?;
    check_tolerance(tolerance)?;
    let window = haystack
        .roi(position, needle.shape())
        .map_err(|_| FlccError::RoiOutOfBounds {
            origin: position.to_vec(),
            shape: needle.shape().dims().to_vec(),
            bounds: haystack.shape().dims().to_vec(),
        })?;
    let field = lcc_with_tolerance(window, needle, tolerance)?;
    Ok(field.data()[0])
}

/// Contiguous copy of `haystack` with its global mean subtracted.
pub(crate) fn centered_haystack<T: Element>(haystack: &TensorView<'_, T>) -> Tensor<T> {
    let mean = mean_of(haystack);
    haystack.map(|&value| value - mean)
}

/// Window-relative haystack offsets paired with conjugated, centered needle
/// values.
pub(crate) struct CrossPlan<T> {
    offsets: Vec<usize>,
    weights: Vec<T>,
}

impl<T: Element> CrossPlan<T> {
    pub(crate) fn new(
        haystack: &TensorView<'_, T>,
        needle: &TensorView<'_, T>,
        stats: &NeedleStats<T>,
    ) -> Self {
        let count = needle.shape().len();
        let mut offsets = Vec::with_capacity(count);
        let mut weights = Vec::with_capacity(count);
        let needle_data = needle.as_slice();
        for_each_index(needle.shape().dims(), |idx| {
            offsets.push(offset_of(idx, haystack.strides()));
            weights.push(stats.center(needle_data[offset_of(idx, needle.strides())]).conj());
        });
        Self { offsets, weights }
    }

    /// Inner product of the window starting at `base` with the centered needle.
    #[inline]
    pub(crate) fn dot(&self, data: &[T], base: usize) -> T {
        let mut acc = T::zero();
        for (&offset, &weight) in self.offsets.iter().zip(&self.weights) {
            acc += data[base + offset] * weight;
        }
        acc
    }
}
