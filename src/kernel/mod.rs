//! Correlation kernels producing full local-correlation fields.
//!
//! Every kernel validates shapes at the call boundary, then computes the raw
//! cross-correlation term and the haystack window sums its own way before
//! handing both to [`crate::normalize::correlate`].

use crate::scalar::Element;
use crate::tensor::{Shape, Tensor, TensorView};
use crate::util::{FlccError, FlccResult};
use num_traits::Float;

pub mod direct;
pub mod fft;

#[cfg(feature = "rayon")]
pub mod rayon;

/// Kernel trait for computing a correlation field.
pub trait Kernel {
    /// Computes the local correlation coefficient at every valid placement.
    ///
    /// Windows (or needles) whose variance falls below
    /// `tolerance * mean_square` score `0`.
    fn correlate<T: Element>(
        haystack: TensorView<'_, T>,
        needle: TensorView<'_, T>,
        tolerance: T::Real,
    ) -> FlccResult<Tensor<T::Real>>;
}

/// Direct sliding-window kernel.
pub struct DirectKernel;

/// FFT-accelerated kernel.
pub struct FftKernel;

/// Row-parallel direct kernel (feature-gated).
#[cfg(feature = "rayon")]
pub struct ParallelDirectKernel;

impl Kernel for DirectKernel {
    fn correlate<T: Element>(
        haystack: TensorView<'_, T>,
        needle: TensorView<'_, T>,
        tolerance: T::Real,
    ) -> FlccResult<Tensor<T::Real>> {
        direct::lcc_with_tolerance(haystack, needle, tolerance)
    }
}

impl Kernel for FftKernel {
    fn correlate<T: Element>(
        haystack: TensorView<'_, T>,
        needle: TensorView<'_, T>,
        tolerance: T::Real,
    ) -> FlccResult<Tensor<T::Real>> {
        fft::flcc_with_tolerance(haystack, needle, tolerance)
    }
}

#[cfg(feature = "rayon")]
impl Kernel for ParallelDirectKernel {
    fn correlate<T: Element>(
        haystack: TensorView<'_, T>,
        needle: TensorView<'_, T>,
        tolerance: T::Real,
    ) -> FlccResult<Tensor<T::Real>> {
        self::rayon::lcc_par_with_tolerance(haystack, needle, tolerance)
    }
}

/// Checks a haystack/needle pair and returns the valid placement shape.
pub(crate) fn validate_pair(haystack: &Shape, needle: &Shape) -> FlccResult<Shape> {
    for shape in [haystack, needle] {
        if shape.rank() == 0 || shape.is_empty() {
            return Err(FlccError::EmptyInput {
                shape: shape.dims().to_vec(),
            });
        }
        if shape.checked_len().is_none() {
            return Err(FlccError::InvalidDimensions {
                shape: shape.dims().to_vec(),
            });
        }
    }
    if haystack.rank() != needle.rank() {
        return Err(FlccError::ShapeMismatch {
            reason: "needle rank differs from haystack rank",
            expected: haystack.dims().to_vec(),
            got: needle.dims().to_vec(),
        });
    }
    haystack
        .valid_positions(needle)
        .ok_or_else(|| FlccError::ShapeMismatch {
            reason: "needle extent exceeds haystack extent",
            expected: haystack.dims().to_vec(),
            got: needle.dims().to_vec(),
        })
}

/// Resolves an optional `f64` tolerance for the real type `R`.
pub(crate) fn resolve_tolerance<R: crate::scalar::Real>(tolerance: Option<f64>) -> FlccResult<R> {
    match tolerance {
        None => Ok(R::default_variance_tolerance()),
        Some(value) if value.is_finite() && value >= 0.0 => Ok(R::from_f64_lossy(value)),
        Some(_) => Err(FlccError::InvalidInput(
            "variance tolerance must be finite and non-negative",
        )),
    }
}

/// Rejects a negative or NaN tolerance.
pub(crate) fn check_tolerance<R: crate::scalar::Real>(tolerance: R) -> FlccResult<()> {
    if tolerance >= R::zero() && tolerance.is_finite() {
        Ok(())
    } else {
        Err(FlccError::InvalidInput(
            "variance tolerance must be finite and non-negative",
        ))
    }
}
