//! Sliding-window sums over axis-aligned boxes.
//!
//! For every valid placement of a window inside a tensor the engine reports
//! the sum of the covered elements and the sum of their squared magnitudes.
//! Both outputs have the valid shape `tensor - window + 1` per axis.

use crate::kernel::validate_pair;
use crate::scalar::Element;
use crate::tensor::{Shape, Tensor, TensorView};
use crate::trace::{trace_event, trace_span};
use crate::util::FlccResult;

mod direct;
mod fft;

pub(crate) use fft::spectral_window_sums;

/// How window sums are accumulated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoxSumMode {
    /// Separable sliding accumulation; exact up to summation error.
    Direct,
    /// Zero-padded FFT correlation with a unit kernel.
    Fft,
}

/// Window sums and sums of squared magnitudes for one window shape.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowSums<T: Element> {
    sums: Tensor<T>,
    sums_sq: Tensor<T::Real>,
    count: usize,
}

impl<T: Element> WindowSums<T> {
    pub(crate) fn from_parts(sums: Tensor<T>, sums_sq: Tensor<T::Real>, count: usize) -> Self {
        debug_assert_eq!(sums.shape(), sums_sq.shape());
        Self {
            sums,
            sums_sq,
            count,
        }
    }

    /// Per-placement window sums.
    pub fn sums(&self) -> &Tensor<T> {
        &self.sums
    }

    /// Per-placement sums of `x * conj(x)`.
    pub fn sums_sq(&self) -> &Tensor<T::Real> {
        &self.sums_sq
    }

    /// Number of elements in one window.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Shape of valid window placements.
    pub fn shape(&self) -> &Shape {
        self.sums.shape()
    }
}

/// Computes window sums of `tensor` for every placement of `window`.
pub fn window_sums<T: Element>(
    tensor: TensorView<'_, T>,
    window: &Shape,
    mode: BoxSumMode,
) -> FlccResult<WindowSums<T>> {
    let valid = validate_pair(tensor.shape(), window)?;
    let _span = trace_span!("window_sums", rank = window.rank(), window_len = window.len()).entered();
    trace_event!("window_sums_input", input_len = tensor.shape().len(), fft = mode == BoxSumMode::Fft);
    let sums = match mode {
        BoxSumMode::Direct => direct::window_sums(&tensor, window),
        BoxSumMode::Fft => fft::window_sums(&tensor, window, &valid),
    };
    debug_assert_eq!(sums.shape(), &valid);
    Ok(sums)
}
