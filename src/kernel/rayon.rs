//! Rayon-parallel direct kernel (feature-gated).
//!
//! Cross terms are computed row-parallel over the first output axis; each
//! worker walks the remaining axes of its row. Window sums and normalization
//! reuse the sequential engine, so values match [`crate::lcc`] exactly.

use crate::boxsum::{window_sums, BoxSumMode};
use crate::kernel::direct::{centered_haystack, CrossPlan};
use crate::kernel::{check_tolerance, validate_pair};
use crate::normalize::{correlate, NeedleStats};
use crate::scalar::{Element, Real};
use crate::tensor::index::{for_each_index, offset_of};
use crate::tensor::{Tensor, TensorView};
use crate::trace::trace_span;
use crate::util::FlccResult;
use rayon::prelude::*;

/// Row-parallel [`crate::lcc`].
pub fn lcc_par<T: Element>(
    haystack: TensorView<'_, T>,
    needle: TensorView<'_, T>,
) -> FlccResult<Tensor<T::Real>> {
    lcc_par_with_tolerance(haystack, needle, T::Real::default_variance_tolerance())
}

/// [`lcc_par`] with an explicit relative variance tolerance.
pub fn lcc_par_with_tolerance<T: Element>(
    haystack: TensorView<'_, T>,
    needle: TensorView<'_, T>,
    tolerance: T::Real,
) -> FlccResult<Tensor<T::Real>> {
    let valid = validate_pair(haystack.shape(), needle.shape())?;
    check_tolerance(tolerance)?;
    let _span = trace_span!(
        "lcc_par",
        rank = valid.rank(),
        haystack_len = haystack.shape().len(),
        needle_len = needle.shape().len(),
        parallel = true
    )
    .entered();

    let shifted = centered_haystack(&haystack);
    let shifted = shifted.view();
    let stats = NeedleStats::from_view(&needle);
    let plan = CrossPlan::new(&shifted, &needle, &stats);
    let data = shifted.as_slice();
    let strides = shifted.strides();
    let row_dims = &valid.dims()[1..];
    let row_len: usize = row_dims.iter().product();

    let mut cross = vec![T::zero(); valid.len()];
    cross
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(row, out)| {
            let row_base = row * strides[0];
            let mut slots = out.iter_mut();
            for_each_index(row_dims, |idx| {
                let base = row_base + offset_of(idx, &strides[1..]);
                if let Some(slot) = slots.next() {
                    *slot = plan.dot(data, base);
                }
            });
        });

    let sums = window_sums(shifted, needle.shape(), BoxSumMode::Direct)?;
    correlate(&cross, &sums, &stats, tolerance)
}
