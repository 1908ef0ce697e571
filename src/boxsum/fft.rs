//! Box sums as zero-padded FFT correlations with a unit kernel.

use crate::boxsum::WindowSums;
use crate::fft::{conjugate_in_place, multiply_in_place, FftNd};
use crate::scalar::Element;
use crate::tensor::{Shape, Tensor, TensorView};
use num_complex::Complex;
use num_traits::{Float, Zero};

pub(super) fn window_sums<T: Element>(
    tensor: &TensorView<'_, T>,
    window: &Shape,
    valid: &Shape,
) -> WindowSums<T> {
    let fft = FftNd::<T::Real>::for_correlation(tensor.shape(), window);
    let mut spectrum = fft.pad(tensor);
    fft.forward(&mut spectrum);
    let mut kernel = fft.box_spectrum(window);
    conjugate_in_place(&mut kernel);
    spectral_window_sums(&fft, &spectrum, &kernel, tensor, T::zero(), window.len(), valid)
}

/// Window sums from an already transformed input.
///
/// `spectrum` is the forward transform of `tensor - offset` padded to
/// `fft.shape()` and `kernel_conj` the conjugated spectrum of the unit box.
/// Both sums describe the shifted tensor. Only the squared magnitudes still
/// need a forward transform.
pub(crate) fn spectral_window_sums<T: Element>(
    fft: &FftNd<T::Real>,
    spectrum: &[Complex<T::Real>],
    kernel_conj: &[Complex<T::Real>],
    tensor: &TensorView<'_, T>,
    offset: T,
    count: usize,
    valid: &Shape,
) -> WindowSums<T> {
    let mut sums = spectrum.to_vec();
    multiply_in_place(&mut sums, kernel_conj);
    fft.inverse(&mut sums);
    let sums: Vec<T> = fft.crop(&sums, valid);

    let mut squares = fft.pad_with(tensor, |value: T| {
        Complex::new((value - offset).norm_sqr(), T::Real::zero())
    });
    fft.forward(&mut squares);
    multiply_in_place(&mut squares, kernel_conj);
    fft.inverse(&mut squares);
    // Round-off can push sums of non-negative terms slightly below zero.
    let sums_sq = fft.crop_with(&squares, valid, |value| value.re.max(T::Real::zero()));

    WindowSums::from_parts(
        Tensor::from_raw(sums, valid.clone()),
        Tensor::from_raw(sums_sq, valid.clone()),
        count,
    )
}
