//! FFT-accelerated local correlation coefficients (FLCC).
//!
//! A one-shot call is a session prepared for the needle's shape and completed
//! once, so the one-shot and the amortized path share the same numerics.

use crate::kernel::{check_tolerance, validate_pair};
use crate::scalar::{Element, Real};
use crate::session::FlccSession;
use crate::tensor::{Tensor, TensorView};
use crate::trace::trace_span;
use crate::util::FlccResult;

/// Computes local correlation coefficients with zero-padded FFTs.
///
/// Matches [`crate::lcc`] within floating-point tolerance in O(N log N).
pub fn flcc<T: Element>(
    haystack: TensorView<'_, T>,
    needle: TensorView<'_, T>,
) -> FlccResult<Tensor<T::Real>> {
    flcc_with_tolerance(haystack, needle, T::Real::default_variance_tolerance())
}

/// [`flcc`] with an explicit relative variance tolerance.
pub fn flcc_with_tolerance<T: Element>(
    haystack: TensorView<'_, T>,
    needle: TensorView<'_, T>,
    tolerance: T::Real,
) -> FlccResult<Tensor<T::Real>> {
    validate_pair(haystack.shape(), needle.shape())?;
    check_tolerance(tolerance)?;
    let _span = trace_span!(
        "flcc",
        rank = haystack.rank(),
        haystack_len = haystack.shape().len(),
        needle_len = needle.shape().len()
    )
    .entered();
    let session = FlccSession::prepare_with_tolerance(haystack, needle.shape(), tolerance)?;
    session.complete(needle)
}
